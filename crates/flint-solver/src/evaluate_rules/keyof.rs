//! `$Keys<O>` / `keyof O` evaluation.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::types::*;
use crate::visitor::contains_type_parameters;
use flint_common::Atom;

/// Union of the keys of `shape` as string literal types, plus the indexer
/// key type if there is one.
pub fn keys_of_shape(interner: &TypeInterner, shape: &ObjectShape) -> TypeId {
    let mut keys: Vec<TypeId> = shape
        .properties
        .iter()
        .map(|p| interner.literal_string_atom(p.name))
        .collect();
    if let Some(indexer) = &shape.indexer {
        keys.push(indexer.key_type);
    }
    interner.union(keys)
}

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_keyof(&mut self, ty: TypeId, operand: TypeId) -> TypeId {
        let interner = self.interner();
        let evaluated = self.evaluate(operand);
        if evaluated.is_any_or_error() {
            return TypeId::STRING;
        }
        if let Some(shape) = self.resolve_object_shape(evaluated) {
            return keys_of_shape(interner, &shape);
        }

        match interner.lookup(evaluated) {
            // Keys every member has.
            Some(TypeData::Union(list)) => {
                let members = interner.type_list(list);
                let mut common: Option<Vec<Atom>> = None;
                for &member in members.iter() {
                    let Some(shape) = self.resolve_object_shape(member) else {
                        return ty;
                    };
                    let names: Vec<Atom> = shape.properties.iter().map(|p| p.name).collect();
                    common = Some(match common {
                        None => names,
                        Some(prev) => prev.into_iter().filter(|n| names.contains(n)).collect(),
                    });
                }
                let keys = common
                    .unwrap_or_default()
                    .into_iter()
                    .map(|name| interner.literal_string_atom(name))
                    .collect();
                interner.union(keys)
            }
            Some(TypeData::Array { .. } | TypeData::Tuple(_)) => TypeId::NUMBER,
            _ if contains_type_parameters(interner, evaluated) => ty,
            Some(
                TypeData::Mapped(_)
                | TypeData::Conditional(_)
                | TypeData::Spread(..)
                | TypeData::Diff(..)
                | TypeData::IndexAccess(..),
            ) => ty,
            _ => TypeId::NEVER,
        }
    }
}
