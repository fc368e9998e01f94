//! Type narrowing for refinements.
//!
//! A [`TypeGuard`] describes a control-flow test on a binding; `narrow`
//! filters the binding's current type by the test's outcome. Narrowing
//! works member by member over unions, so `?T` tested for truthiness
//! loses `null` and `void` while `T` is kept.
//!
//! Narrowing to `empty` means the branch cannot be taken.

use crate::def::TypeResolver;
use crate::intern::TypeInterner;
use crate::objects::PropertyAccess;
use crate::subtype::SubtypeChecker;
use crate::types::*;
use flint_common::Atom;
use tracing::trace;

/// Result of `typeof x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeofKind {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Undefined,
    Object,
    Function,
}

impl TypeofKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "bigint" => Self::Bigint,
            "symbol" => Self::Symbol,
            "undefined" => Self::Undefined,
            "object" => Self::Object,
            "function" => Self::Function,
            _ => return None,
        })
    }

    const fn primitive(self) -> Option<TypeId> {
        match self {
            Self::String => Some(TypeId::STRING),
            Self::Number => Some(TypeId::NUMBER),
            Self::Boolean => Some(TypeId::BOOLEAN),
            Self::Bigint => Some(TypeId::BIGINT),
            Self::Symbol => Some(TypeId::SYMBOL),
            Self::Undefined => Some(TypeId::VOID),
            Self::Object | Self::Function => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeGuard {
    /// `x === v` where `v` has a singleton (literal, `null`, `void`) or
    /// primitive type.
    LiteralEquality(TypeId),
    /// `x.tag === v`
    Discriminant { property: Atom, value: TypeId },
    /// `if (x)`
    Truthy,
    /// `x == null`
    Nullish,
    Typeof(TypeofKind),
    /// A call to a function declared `(x: mixed) => x is T`.
    Predicate(TypeId),
}

/// Whether `ty` has exactly one inhabitant.
pub(crate) fn is_singleton(ty: TypeId, data: Option<&TypeData>) -> bool {
    matches!(ty, TypeId::NULL | TypeId::VOID) || matches!(data, Some(TypeData::Literal(_)))
}

impl<R: TypeResolver + ?Sized> SubtypeChecker<'_, R> {
    /// Narrow `ty` by `guard`; `sense` is the branch taken.
    pub fn narrow(&mut self, ty: TypeId, guard: &TypeGuard, sense: bool) -> TypeId {
        if ty == TypeId::ERROR {
            return ty;
        }
        let evaluated = self.evaluator.evaluate(ty);
        let members = self.expand_members(evaluated);
        let mut kept = Vec::with_capacity(members.len());
        for member in members {
            if let Some(narrowed) = self.narrow_member(member, guard, sense) {
                kept.push(narrowed);
            }
        }
        let result = self.interner.union(kept);
        trace!(ty = ty.0, result = result.0, sense, "narrow");
        result
    }

    /// Union members with `boolean` split into its literals.
    fn expand_members(&mut self, ty: TypeId) -> Vec<TypeId> {
        let members = self.interner.union_members(ty);
        let mut expanded = Vec::with_capacity(members.len() + 1);
        for member in members {
            if member == TypeId::BOOLEAN {
                expanded.push(TypeId::BOOLEAN_TRUE);
                expanded.push(TypeId::BOOLEAN_FALSE);
            } else {
                expanded.push(self.evaluator.evaluate(member));
            }
        }
        expanded
    }

    fn narrow_member(&mut self, member: TypeId, guard: &TypeGuard, sense: bool) -> Option<TypeId> {
        let data = self.interner.lookup(member);
        match guard {
            TypeGuard::LiteralEquality(value) => {
                let value = *value;
                let value_data = self.interner.lookup(value);
                if sense {
                    if member == value || member == TypeId::ANY {
                        return Some(member);
                    }
                    if self.is_subtype_of(value, member) {
                        return Some(value);
                    }
                    if self.is_subtype_of(member, value) {
                        return Some(member);
                    }
                    None
                } else if member == value && is_singleton(value, value_data.as_ref()) {
                    None
                } else {
                    Some(member)
                }
            }
            TypeGuard::Nullish => {
                let nullish = matches!(member, TypeId::NULL | TypeId::VOID);
                match member {
                    TypeId::UNKNOWN | TypeId::ANY if sense => {
                        Some(self.interner.union2(TypeId::NULL, TypeId::VOID))
                    }
                    _ if nullish == sense => Some(member),
                    TypeId::UNKNOWN | TypeId::ANY => Some(member),
                    _ => None,
                }
            }
            TypeGuard::Truthy => match truthiness(self.interner, member, data.as_ref()) {
                Truthiness::AlwaysTruthy if sense => Some(member),
                Truthiness::AlwaysFalsy if !sense => Some(member),
                Truthiness::Either => Some(member),
                _ => None,
            },
            TypeGuard::Typeof(kind) => self.narrow_typeof(member, data.as_ref(), *kind, sense),
            TypeGuard::Predicate(guarded) => {
                let guarded = *guarded;
                if sense {
                    if self.is_subtype_of(member, guarded) {
                        Some(member)
                    } else if self.is_subtype_of(guarded, member) {
                        Some(guarded)
                    } else {
                        None
                    }
                } else if member != TypeId::ANY && self.is_subtype_of(member, guarded) {
                    None
                } else {
                    Some(member)
                }
            }
            TypeGuard::Discriminant { property, value } => {
                self.narrow_discriminant(member, data.as_ref(), *property, *value, sense)
            }
        }
    }

    fn narrow_typeof(
        &mut self,
        member: TypeId,
        data: Option<&TypeData>,
        kind: TypeofKind,
        sense: bool,
    ) -> Option<TypeId> {
        if matches!(member, TypeId::UNKNOWN | TypeId::ANY) {
            if !sense {
                return Some(member);
            }
            return Some(kind.primitive().unwrap_or(member));
        }
        let matches = match kind.primitive() {
            Some(TypeId::VOID) => member == TypeId::VOID,
            Some(primitive) => {
                member == primitive
                    || matches!(data, Some(TypeData::Literal(lit)) if lit.primitive() == primitive)
                    || (primitive == TypeId::BOOLEAN
                        && matches!(member, TypeId::BOOLEAN_TRUE | TypeId::BOOLEAN_FALSE))
            }
            None => {
                let is_function = matches!(
                    data,
                    Some(TypeData::Function(_) | TypeData::Class(_) | TypeData::Component(_))
                );
                let is_object = member == TypeId::NULL
                    || matches!(
                        data,
                        Some(
                            TypeData::Object(_)
                                | TypeData::Array { .. }
                                | TypeData::Tuple(_)
                                | TypeData::Instance(_)
                                | TypeData::Builtin(..)
                                | TypeData::Iterator(_)
                                | TypeData::Element(_)
                        )
                    );
                if kind == TypeofKind::Function {
                    is_function
                } else {
                    is_object
                }
            }
        };
        let generic = matches!(data, Some(TypeData::TypeParameter(_) | TypeData::Opaque(_)));
        if matches == sense || generic {
            Some(member)
        } else {
            None
        }
    }

    fn narrow_discriminant(
        &mut self,
        member: TypeId,
        data: Option<&TypeData>,
        property: Atom,
        value: TypeId,
        sense: bool,
    ) -> Option<TypeId> {
        if !matches!(
            data,
            Some(TypeData::Object(_) | TypeData::Instance(_) | TypeData::Intersection(_))
        ) {
            return Some(member);
        }
        let tag = match self.evaluator.property_of(member, property) {
            PropertyAccess::Found { type_id, .. } => self.evaluator.evaluate(type_id),
            PropertyAccess::Missing => {
                let exact = self
                    .interner
                    .object_shape_of(member)
                    .is_some_and(|shape| shape.exact);
                return if exact && sense { None } else { Some(member) };
            }
        };
        let tag_data = self.interner.lookup(tag);
        if sense {
            if tag.is_any_or_error() || self.is_subtype_of(value, tag) || self.is_subtype_of(tag, value)
            {
                Some(member)
            } else {
                None
            }
        } else if tag == value && is_singleton(tag, tag_data.as_ref()) {
            None
        } else {
            Some(member)
        }
    }
}

enum Truthiness {
    AlwaysTruthy,
    AlwaysFalsy,
    Either,
}

fn truthiness(interner: &TypeInterner, ty: TypeId, data: Option<&TypeData>) -> Truthiness {
    match ty {
        TypeId::NULL | TypeId::VOID | TypeId::BOOLEAN_FALSE => return Truthiness::AlwaysFalsy,
        TypeId::BOOLEAN_TRUE => return Truthiness::AlwaysTruthy,
        _ => {}
    }
    match data {
        Some(TypeData::Literal(LiteralValue::String(atom))) => {
            if interner.resolve_atom_ref(*atom).is_empty() {
                Truthiness::AlwaysFalsy
            } else {
                Truthiness::AlwaysTruthy
            }
        }
        Some(TypeData::Literal(LiteralValue::Number(bits))) => {
            let v = bits.value();
            if v == 0.0 || v.is_nan() {
                Truthiness::AlwaysFalsy
            } else {
                Truthiness::AlwaysTruthy
            }
        }
        Some(
            TypeData::Object(_)
            | TypeData::Array { .. }
            | TypeData::Tuple(_)
            | TypeData::Function(_)
            | TypeData::Instance(_)
            | TypeData::Class(_)
            | TypeData::Builtin(..)
            | TypeData::Iterator(_)
            | TypeData::Component(_)
            | TypeData::Element(_),
        ) => Truthiness::AlwaysTruthy,
        _ => Truthiness::Either,
    }
}

#[cfg(test)]
#[path = "../tests/narrowing_tests.rs"]
mod tests;
