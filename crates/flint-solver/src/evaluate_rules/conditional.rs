//! Conditional types `C extends E ? T : F`.
//!
//! Deferred while `C` or `E` mention free type parameters. A union check
//! type distributes over its members. `infer V` placeholders in `E` are
//! bound by matching `C` against `E`; unmatched placeholders are `mixed`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::generics::InferenceContext;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::subtype::SubtypeChecker;
use crate::types::*;
use crate::visitor::{collect_infer_names, contains_type_parameters};
use flint_common::Atom;

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_conditional(&mut self, ty: TypeId, cond: &ConditionalType) -> TypeId {
        let interner = self.interner();
        let check = self.evaluate(cond.check_type);

        let mut infer_names = Vec::new();
        collect_infer_names(interner, cond.extends_type, &mut infer_names);
        let mut erased = TypeSubstitution::new();
        for &name in &infer_names {
            erased.insert(name, TypeId::UNKNOWN);
        }
        let extends_erased = instantiate_type(interner, cond.extends_type, &erased);
        if contains_type_parameters(interner, check)
            || contains_type_parameters(interner, extends_erased)
        {
            return ty;
        }

        if check == TypeId::NEVER {
            return TypeId::NEVER;
        }
        if check.is_any_or_error() {
            let when_true = instantiate_type(interner, cond.true_type, &erased);
            let when_true = self.evaluate(when_true);
            let when_false = self.evaluate(cond.false_type);
            return interner.union2(when_true, when_false);
        }

        if let Some(TypeData::Union(list)) = interner.lookup(check) {
            let members = interner.declared_members(check, list);
            let results: Vec<TypeId> = members
                .iter()
                .map(|&member| self.conditional_branch(member, cond, &infer_names))
                .collect();
            return interner.union(results);
        }
        self.conditional_branch(check, cond, &infer_names)
    }

    fn conditional_branch(
        &mut self,
        check: TypeId,
        cond: &ConditionalType,
        infer_names: &[Atom],
    ) -> TypeId {
        let interner = self.interner();
        let mut context = InferenceContext::new(infer_names.to_vec());
        context.infer(self, check, cond.extends_type);
        let mut subst = context.resolve(interner, false);
        for &name in infer_names {
            if subst.get(name).is_none() {
                subst.insert(name, TypeId::UNKNOWN);
            }
        }

        let extends = instantiate_type(interner, cond.extends_type, &subst);
        let holds = SubtypeChecker::new(interner, self.resolver()).is_subtype_of(check, extends);
        if holds {
            let when_true = instantiate_type(interner, cond.true_type, &subst);
            self.evaluate(when_true)
        } else {
            self.evaluate(cond.false_type)
        }
    }
}
