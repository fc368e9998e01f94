//! Union targets and intersection sources.

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::objects::compose;
use crate::subtype::{RuleResult, SubtypeChecker, mismatch};
use crate::types::*;
use std::mem::discriminant;

impl<R: TypeResolver + ?Sized> SubtypeChecker<'_, R> {
    /// `s <: A | B | ...` holds if `s` is a subtype of some member.
    ///
    /// On failure, if exactly one member has the same kind as `s` (both
    /// objects, both functions, ...), its failure is the more useful
    /// explanation and is returned instead of the generic one.
    pub(crate) fn check_union_target(
        &mut self,
        s: TypeId,
        t: TypeId,
        list: TypeListId,
    ) -> RuleResult {
        let members = self.interner.type_list(list);
        if members.contains(&s) {
            return Ok(());
        }
        if s == TypeId::BOOLEAN
            && members.contains(&TypeId::BOOLEAN_TRUE)
            && members.contains(&TypeId::BOOLEAN_FALSE)
        {
            return Ok(());
        }

        let s_kind = self.interner.lookup(s).map(|d| discriminant(&d));
        let mut same_kind_failures = Vec::new();
        for &member in members.iter() {
            match self.check_subtype(s, member) {
                Ok(()) => return Ok(()),
                Err(reason) => {
                    let member = self.evaluator.evaluate(member);
                    let m_kind = self.interner.lookup(member).map(|d| discriminant(&d));
                    if s_kind.is_some() && s_kind == m_kind && !member.is_intrinsic() {
                        same_kind_failures.push(reason);
                    }
                }
            }
        }

        if same_kind_failures.len() == 1 {
            if let Some(reason) = same_kind_failures.pop() {
                return Err(reason);
            }
        }
        Err(Box::new(SubtypeFailureReason::NoUnionMember {
            source: s,
            target: t,
        }))
    }

    /// `A & B <: t` holds if some member is a subtype of `t`, or if the
    /// members are all objects and their merge is.
    pub(crate) fn check_intersection_source(
        &mut self,
        s: TypeId,
        t: TypeId,
        list: TypeListId,
    ) -> RuleResult {
        let members = self.interner.type_list(list);
        for &member in members.iter() {
            if self.check_subtype(member, t).is_ok() {
                return Ok(());
            }
        }

        let mut shapes = Vec::with_capacity(members.len());
        for &member in members.iter() {
            match self.evaluator.resolve_object_shape(member) {
                Some(shape) => shapes.push(shape),
                None => return Err(mismatch(s, t)),
            }
        }
        let merged = self.interner.object_with_shape(compose(&shapes, false));
        if merged == s {
            return Err(mismatch(s, t));
        }
        self.check_subtype(merged, t)
    }
}
