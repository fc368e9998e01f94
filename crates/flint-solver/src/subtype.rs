//! Structural subtyping.
//!
//! `SubtypeChecker::check(source, target)` decides `source <: target` and,
//! on failure, returns the chain of reasons leading to the first failing
//! comparison.
//!
//! Recursive types are handled co-inductively: a pair that is already
//! being compared higher up the stack is assumed to hold. Exceeding the
//! depth limit also answers "holds" (and is recorded) so deep but finite
//! types never produce spurious errors. Failures are cached; successes are
//! not, since they may rest on co-inductive assumptions.
//!
//! Rule order:
//! 1. identity, `any`, `empty` source, `mixed` target
//! 2. evaluation to head normal form
//! 3. union source (every member), intersection target (every member)
//! 4. union target (some member), intersection source (some member, or
//!    the merged object)
//! 5. type parameters via bound, opaque types via representation or bound
//! 6. structural rules (`subtype_rules`)

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use rustc_hash::FxHashSet;
use tracing::{Level, span, trace};

/// Result of one rule; the reason is boxed to keep the happy path small.
pub(crate) type RuleResult = Result<(), Box<SubtypeFailureReason>>;

pub(crate) fn mismatch(source: TypeId, target: TypeId) -> Box<SubtypeFailureReason> {
    Box::new(SubtypeFailureReason::mismatch(source, target))
}

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

pub struct SubtypeChecker<'a, R: TypeResolver + ?Sized> {
    pub(crate) interner: &'a TypeInterner,
    pub(crate) resolver: &'a R,
    pub(crate) evaluator: TypeEvaluator<'a, R>,
    guard: RecursionGuard<(TypeId, TypeId)>,
    failures: FxHashSet<(TypeId, TypeId)>,
    depth_exceeded: bool,
}

impl<'a, R: TypeResolver + ?Sized> SubtypeChecker<'a, R> {
    pub fn new(interner: &'a TypeInterner, resolver: &'a R) -> Self {
        Self {
            interner,
            resolver,
            evaluator: TypeEvaluator::new(interner, resolver),
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
            failures: FxHashSet::default(),
            depth_exceeded: false,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.guard =
            RecursionGuard::with_profile(RecursionProfile::SubtypeCheck).with_max_depth(max_depth);
        self
    }

    #[must_use]
    pub fn with_evaluate_depth(mut self, max_depth: u32) -> Self {
        self.evaluator = TypeEvaluator::new(self.interner, self.resolver).with_max_depth(max_depth);
        self
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn resolver(&self) -> &'a R {
        self.resolver
    }

    pub fn evaluator(&mut self) -> &mut TypeEvaluator<'a, R> {
        &mut self.evaluator
    }

    /// Whether some comparison gave up at the depth limit.
    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_ok()
    }

    /// Mutual subtyping.
    pub fn is_equivalent(&mut self, left: TypeId, right: TypeId) -> bool {
        self.is_subtype_of(left, right) && self.is_subtype_of(right, left)
    }

    /// `source <: target`, with the failure chain on error.
    pub fn check(&mut self, source: TypeId, target: TypeId) -> Result<(), SubtypeFailureReason> {
        let _span = span!(Level::TRACE, "subtype", source = source.0, target = target.0).entered();
        self.check_subtype(source, target).map_err(|reason| *reason)
    }

    pub(crate) fn check_subtype(&mut self, source: TypeId, target: TypeId) -> RuleResult {
        if source == target
            || source.is_any_or_error()
            || target.is_any_or_error()
            || source == TypeId::NEVER
            || target == TypeId::UNKNOWN
        {
            return Ok(());
        }
        if self.failures.contains(&(source, target)) {
            return Err(mismatch(source, target));
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(source = source.0, target = target.0, "subtype: cycle, assuming true");
                return Ok(());
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(source = source.0, target = target.0, "subtype: limit exceeded");
                self.depth_exceeded = true;
                return Ok(());
            }
        }

        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.check_structural(source, target)
        });
        self.guard.leave((source, target));

        if result.is_err() {
            self.failures.insert((source, target));
        }
        result
    }

    fn check_structural(&mut self, source: TypeId, target: TypeId) -> RuleResult {
        let s = self.evaluator.evaluate(source);
        let t = self.evaluator.evaluate(target);
        if s != source || t != target {
            return self.check_subtype(s, t);
        }

        let interner = self.interner;
        let s_data = interner.lookup(s);
        let t_data = interner.lookup(t);

        if let Some(TypeData::Union(list)) = &s_data {
            let members = interner.type_list(*list);
            for &member in members.iter() {
                self.check_subtype(member, t)?;
            }
            return Ok(());
        }
        if let Some(TypeData::Intersection(list)) = &t_data {
            let members = interner.type_list(*list);
            for &member in members.iter() {
                self.check_subtype(s, member)?;
            }
            return Ok(());
        }
        if let Some(TypeData::Union(list)) = &t_data {
            return self.check_union_target(s, t, *list);
        }
        if let Some(TypeData::Intersection(list)) = &s_data {
            return self.check_intersection_source(s, t, *list);
        }

        if let Some(TypeData::TypeParameter(info)) = &s_data {
            return match info.bound {
                Some(bound) if bound != s => self.check_subtype(bound, t),
                _ => Err(mismatch(s, t)),
            };
        }

        if let Some(result) = self.check_opaque(s, t) {
            return result;
        }

        if is_deferred(s_data.as_ref()) || is_deferred(t_data.as_ref()) {
            if matches!(s_data, Some(TypeData::KeyOf(_))) && t == TypeId::STRING {
                return Ok(());
            }
            if let Some(result) = self.check_restored_spread(s, t) {
                return result;
            }
            return Err(mismatch(s, t));
        }

        if t == TypeId::REACT_NODE {
            return self.check_react_node(s);
        }

        self.check_data(s, s_data.as_ref(), t, t_data.as_ref())
    }

    fn check_data(
        &mut self,
        s: TypeId,
        s_data: Option<&TypeData>,
        t: TypeId,
        t_data: Option<&TypeData>,
    ) -> RuleResult {
        let interner = self.interner;
        match (s_data, t_data) {
            (Some(TypeData::Literal(lit)), _) if lit.primitive() == t => Ok(()),
            (Some(TypeData::Object(s_id)), Some(TypeData::Object(t_id))) => {
                let s_shape = interner.object_shape(*s_id);
                let t_shape = interner.object_shape(*t_id);
                self.check_object_subtype(s, &s_shape, t, &t_shape)
            }
            (Some(TypeData::Instance(a)), Some(TypeData::Instance(b))) => {
                if self.class_derives_from(*a, *b) {
                    Ok(())
                } else {
                    Err(mismatch(s, t))
                }
            }
            (Some(TypeData::Class(a)), Some(TypeData::Class(b))) => {
                if self.class_derives_from(*a, *b) {
                    Ok(())
                } else {
                    Err(mismatch(s, t))
                }
            }
            (Some(TypeData::Instance(_)), Some(TypeData::Object(t_id))) => {
                let Some(s_shape) = self.evaluator.resolve_object_shape(s) else {
                    return Err(mismatch(s, t));
                };
                let s_shape = ObjectShape {
                    exact: false,
                    ..(*s_shape).clone()
                };
                let t_shape = interner.object_shape(*t_id);
                self.check_object_subtype(s, &s_shape, t, &t_shape)
            }
            (Some(TypeData::Class(def_id)), Some(TypeData::Object(_))) => {
                match self.resolver.class_statics(*def_id) {
                    Some(statics) => self.check_subtype(statics, t),
                    None => Err(mismatch(s, t)),
                }
            }
            (Some(TypeData::Function(s_id)), Some(TypeData::Function(t_id))) => {
                let s_fn = interner.function_shape(*s_id);
                let t_fn = interner.function_shape(*t_id);
                self.check_function_subtype(s, &s_fn, t, &t_fn)
            }
            (
                Some(TypeData::Array { .. } | TypeData::Tuple(_)),
                Some(TypeData::Array { .. } | TypeData::Tuple(_)),
            ) => self.check_array_like(s, s_data, t, t_data),
            (Some(TypeData::Builtin(s_kind, s_list)), Some(TypeData::Builtin(t_kind, t_list)))
                if s_kind == t_kind =>
            {
                self.check_builtin(*s_kind, *s_list, *t_list)
            }
            (Some(TypeData::Iterator(a)), Some(TypeData::Iterator(b))) => {
                self.check_iterator(a, b)
            }
            (Some(TypeData::Component(a)), Some(TypeData::Component(b))) => {
                self.check_component(a, b)
            }
            (Some(TypeData::Function(s_id)), Some(TypeData::Component(b))) => {
                let s_fn = interner.function_shape(*s_id);
                self.check_function_component(&s_fn, b)
            }
            (Some(TypeData::Element(a)), Some(TypeData::Element(b))) => {
                self.check_subtype(*a, *b).map_err(|nested| {
                    Box::new(SubtypeFailureReason::TypeArgumentMismatch {
                        name: "Component",
                        nested,
                    })
                })
            }
            (Some(TypeData::Application(a)), Some(TypeData::Application(b))) => {
                let a = interner.type_application(*a);
                let b = interner.type_application(*b);
                if a.base != b.base || a.args.len() != b.args.len() {
                    return Err(mismatch(s, t));
                }
                for (&sa, &ta) in a.args.iter().zip(b.args.iter()) {
                    self.check_invariant(sa, ta, "T")?;
                }
                Ok(())
            }
            (_, Some(TypeData::Object(t_id))) => {
                let t_shape = interner.object_shape(*t_id);
                self.check_iterable_target(s, t, &t_shape)
            }
            _ => Err(mismatch(s, t)),
        }
    }

    /// Both directions, reported as a type argument mismatch.
    pub(crate) fn check_invariant(
        &mut self,
        source: TypeId,
        target: TypeId,
        name: &'static str,
    ) -> RuleResult {
        let wrap = |nested| Box::new(SubtypeFailureReason::TypeArgumentMismatch { name, nested });
        self.check_subtype(source, target).map_err(wrap)?;
        self.check_subtype(target, source).map_err(wrap)
    }

    fn class_derives_from(&self, mut class: crate::def::DefId, ancestor: crate::def::DefId) -> bool {
        for _ in 0..64 {
            if class == ancestor {
                return true;
            }
            match self.resolver.class_extends(class) {
                Some(parent) => class = parent,
                None => return false,
            }
        }
        false
    }

    /// Nominal comparison for opaque types; `None` when neither side is
    /// opaque.
    fn check_opaque(&mut self, s: TypeId, t: TypeId) -> Option<RuleResult> {
        let s_opaque = self.opaque_parts(s);
        let t_opaque = self.opaque_parts(t);
        match (s_opaque, t_opaque) {
            (None, None) => None,
            (Some((a, a_args)), Some((b, b_args))) if a == b => {
                for (&sa, &ta) in a_args.iter().zip(b_args.iter()) {
                    if let Err(reason) = self.check_invariant(sa, ta, "T") {
                        return Some(Err(reason));
                    }
                }
                Some(Ok(()))
            }
            (Some((def_id, args)), _) => {
                let view = self
                    .resolver
                    .opaque_underlying(def_id)
                    .or_else(|| self.resolver.opaque_bound(def_id));
                Some(match view {
                    Some(view) => {
                        let view = self.instantiate_def(def_id, view, &args);
                        self.check_subtype(view, t)
                    }
                    None => Err(mismatch(s, t)),
                })
            }
            (None, Some((def_id, args))) => Some(match self.resolver.opaque_underlying(def_id) {
                Some(underlying) => {
                    let underlying = self.instantiate_def(def_id, underlying, &args);
                    self.check_subtype(s, underlying)
                }
                None => Err(mismatch(s, t)),
            }),
        }
    }

    fn opaque_parts(&self, ty: TypeId) -> Option<(crate::def::DefId, Vec<TypeId>)> {
        match self.interner.lookup(ty)? {
            TypeData::Opaque(def_id) => Some((def_id, Vec::new())),
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                match self.interner.lookup(app.base)? {
                    TypeData::Opaque(def_id) => Some((def_id, app.args.clone())),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn instantiate_def(&self, def_id: crate::def::DefId, body: TypeId, args: &[TypeId]) -> TypeId {
        if args.is_empty() {
            return body;
        }
        let params = self.resolver.get_lazy_type_params(def_id).unwrap_or_default();
        let args = crate::generics::fill_type_arguments(self.interner, &params, args);
        let subst = crate::instantiate::TypeSubstitution::from_args(&params, &args);
        crate::instantiate::instantiate_type(self.interner, body, &subst)
    }

    /// Anything React can render.
    fn check_react_node(&mut self, s: TypeId) -> RuleResult {
        match s {
            TypeId::STRING | TypeId::NUMBER | TypeId::BOOLEAN | TypeId::NULL | TypeId::VOID => {
                return Ok(());
            }
            _ => {}
        }
        match self.interner.lookup(s) {
            Some(TypeData::Literal(lit)) if lit.primitive() != TypeId::BIGINT => Ok(()),
            Some(TypeData::Element(_)) => Ok(()),
            Some(TypeData::Array { element, .. }) => self.check_subtype(element, TypeId::REACT_NODE),
            Some(TypeData::Tuple(list)) => {
                let elements = self.interner.type_list(list);
                for &element in elements.iter() {
                    self.check_subtype(element, TypeId::REACT_NODE)?;
                }
                Ok(())
            }
            _ => Err(mismatch(s, TypeId::REACT_NODE)),
        }
    }
}

fn is_deferred(data: Option<&TypeData>) -> bool {
    matches!(
        data,
        Some(
            TypeData::Mapped(_)
                | TypeData::KeyOf(_)
                | TypeData::IndexAccess(..)
                | TypeData::Conditional(_)
                | TypeData::Spread(..)
                | TypeData::ReadOnly { .. }
                | TypeData::Diff(..)
                | TypeData::Infer(_)
                | TypeData::Lazy(_)
        )
    )
}

/// `source <: target` with a fresh checker.
pub fn is_subtype_of<R: TypeResolver + ?Sized>(
    interner: &TypeInterner,
    resolver: &R,
    source: TypeId,
    target: TypeId,
) -> bool {
    SubtypeChecker::new(interner, resolver).is_subtype_of(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
