//! Type evaluation.
//!
//! Brings a type to head normal form: alias references are expanded,
//! applications of aliases are instantiated, and type destructors (mapped
//! types, `$Keys`, indexed access, conditionals, spreads, `$ReadOnly`,
//! `$Diff`) are computed when their operands are concrete.
//!
//! Evaluation never fails. A destructor whose operands still mention free
//! type parameters stays as a deferred node and is re-evaluated after
//! substitution. Revisiting a node that is already being evaluated returns
//! it unevaluated, which is what keeps recursive aliases finite.

use crate::def::{DefKind, TypeResolver};
use crate::generics::fill_type_arguments;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;

pub struct TypeEvaluator<'a, R: TypeResolver + ?Sized> {
    interner: &'a TypeInterner,
    resolver: &'a R,
    guard: RecursionGuard<TypeId>,
    cache: FxHashMap<TypeId, TypeId>,
}

impl<'a, R: TypeResolver + ?Sized> TypeEvaluator<'a, R> {
    pub fn new(interner: &'a TypeInterner, resolver: &'a R) -> Self {
        Self {
            interner,
            resolver,
            guard: RecursionGuard::with_profile(RecursionProfile::TypeEvaluation),
            cache: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.guard = RecursionGuard::with_profile(RecursionProfile::TypeEvaluation)
            .with_max_depth(max_depth);
        self
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn resolver(&self) -> &'a R {
        self.resolver
    }

    /// Evaluate `ty` to head normal form.
    pub fn evaluate(&mut self, ty: TypeId) -> TypeId {
        if ty.is_intrinsic() {
            return ty;
        }
        if let Some(&cached) = self.cache.get(&ty) {
            return cached;
        }

        let entered = self.guard.enter(ty);
        if !entered.is_entered() {
            trace!(type_id = ty.0, result = ?entered, "evaluate: not entered");
            return ty;
        }
        let result = self.evaluate_inner(ty);
        self.guard.leave(ty);

        self.cache.insert(ty, result);
        result
    }

    fn evaluate_inner(&mut self, ty: TypeId) -> TypeId {
        let Some(data) = self.interner.lookup(ty) else {
            return ty;
        };
        match data {
            TypeData::Lazy(def_id) => {
                if self.resolver.def_kind(def_id) != Some(DefKind::TypeAlias) {
                    return ty;
                }
                let Some(body) = self.resolver.resolve_lazy(def_id) else {
                    return ty;
                };
                let body = self.drop_self_reference(body, ty);
                self.evaluate(body)
            }
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                self.evaluate_application(ty, app.base, &app.args)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.evaluate_mapped(ty, &mapped)
            }
            TypeData::KeyOf(inner) => self.evaluate_keyof(ty, inner),
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(ty, object, index),
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                self.evaluate_conditional(ty, &cond)
            }
            TypeData::Spread(list, exact) => {
                let operands = self.interner.type_list(list);
                self.evaluate_spread(ty, &operands, exact)
            }
            TypeData::ReadOnly { inner, deep } => self.evaluate_readonly(ty, inner, deep),
            TypeData::Diff(left, right) => self.evaluate_diff(ty, left, right),
            _ => ty,
        }
    }

    fn evaluate_application(&mut self, ty: TypeId, base: TypeId, args: &[TypeId]) -> TypeId {
        let Some(TypeData::Lazy(def_id)) = self.interner.lookup(base) else {
            // Applications of opaque types and classes stay nominal.
            return ty;
        };
        if self.resolver.def_kind(def_id) != Some(DefKind::TypeAlias) {
            return ty;
        }
        let Some(body) = self.resolver.resolve_lazy(def_id) else {
            return ty;
        };
        let params = self.resolver.get_lazy_type_params(def_id).unwrap_or_default();
        let args = fill_type_arguments(self.interner, &params, args);
        let subst = TypeSubstitution::from_args(&params, &args);
        let instantiated = instantiate_type(self.interner, body, &subst);
        let instantiated = self.drop_self_reference(instantiated, ty);
        self.evaluate(instantiated)
    }

    /// `type T = null | T` denotes `null`: a union member that refers back
    /// to the alias being expanded contributes nothing.
    fn drop_self_reference(&self, body: TypeId, self_ty: TypeId) -> TypeId {
        match self.interner.lookup(body) {
            Some(TypeData::Union(list)) => {
                let members = self.interner.type_list(list);
                if !members.contains(&self_ty) {
                    return body;
                }
                trace!(type_id = self_ty.0, "evaluate: dropping self-referential union member");
                let rest: Vec<TypeId> = members.iter().copied().filter(|&m| m != self_ty).collect();
                self.interner.union(rest)
            }
            _ => body,
        }
    }

    /// Object shape of `ty` after evaluation, looking through class
    /// instances and merging intersections of objects.
    pub fn resolve_object_shape(&mut self, ty: TypeId) -> Option<Arc<ObjectShape>> {
        let evaluated = self.evaluate(ty);
        match self.interner.lookup(evaluated)? {
            TypeData::Object(shape_id) => Some(self.interner.object_shape(shape_id)),
            TypeData::Instance(def_id) => {
                let body = self.resolver.class_instance(def_id)?;
                if body == evaluated {
                    return None;
                }
                self.resolve_object_shape(body)
            }
            TypeData::Intersection(list) => {
                let members = self.interner.declared_members(evaluated, list);
                let mut shapes = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    shapes.push(self.resolve_object_shape(member)?);
                }
                Some(Arc::new(crate::objects::compose(&shapes, false)))
            }
            _ => None,
        }
    }

    /// Whether `ty` evaluates to something other than a deferred node.
    pub fn is_concrete(&mut self, ty: TypeId) -> bool {
        let evaluated = self.evaluate(ty);
        !crate::visitor::contains_type_parameters(self.interner, evaluated)
            && !matches!(
                self.interner.lookup(evaluated),
                Some(
                    TypeData::Mapped(_)
                        | TypeData::KeyOf(_)
                        | TypeData::IndexAccess(..)
                        | TypeData::Conditional(_)
                        | TypeData::Spread(..)
                        | TypeData::ReadOnly { .. }
                        | TypeData::Diff(..)
                )
            )
    }
}

/// Evaluate `ty` with a fresh evaluator.
pub fn evaluate_type<R: TypeResolver + ?Sized>(
    interner: &TypeInterner,
    resolver: &R,
    ty: TypeId,
) -> TypeId {
    TypeEvaluator::new(interner, resolver).evaluate(ty)
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
