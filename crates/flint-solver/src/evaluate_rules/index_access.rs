//! Indexed access `O[K]`.
//!
//! The result for a named key is the declared property type; optionality
//! is not folded in, so `{[K in keyof O]: O[K]}` reproduces `O`. Reading a
//! write-only property yields `mixed`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::types::*;
use crate::visitor::contains_type_parameters;

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_index_access(
        &mut self,
        ty: TypeId,
        object: TypeId,
        index: TypeId,
    ) -> TypeId {
        let interner = self.interner();
        let object = self.evaluate(object);
        let index = self.evaluate(index);
        if object.is_any_or_error() || index.is_any_or_error() {
            return TypeId::ANY;
        }
        if contains_type_parameters(interner, object) || contains_type_parameters(interner, index)
        {
            return ty;
        }

        if let Some(TypeData::Union(list)) = interner.lookup(index) {
            let members = interner.type_list(list);
            let results: Vec<TypeId> = members
                .iter()
                .map(|&key| {
                    let access = interner.index_access(object, key);
                    self.evaluate(access)
                })
                .collect();
            return interner.union(results);
        }

        if let Some(shape) = self.resolve_object_shape(object) {
            return match interner.lookup(index) {
                Some(TypeData::Literal(LiteralValue::String(name))) => {
                    match shape.property(name) {
                        Some(prop) if !prop.variance.is_readable() => TypeId::UNKNOWN,
                        Some(prop) => prop.type_id,
                        None => shape
                            .indexer
                            .as_ref()
                            .map_or(TypeId::ERROR, |idx| idx.value_type),
                    }
                }
                _ => match &shape.indexer {
                    Some(indexer) => indexer.value_type,
                    None => interner.union(
                        shape
                            .properties
                            .iter()
                            .filter(|p| p.variance.is_readable())
                            .map(|p| p.type_id)
                            .collect(),
                    ),
                },
            };
        }

        match interner.lookup(object) {
            Some(TypeData::Array { element, .. }) => element,
            Some(TypeData::Tuple(list)) => {
                let elements = interner.type_list(list);
                match interner.lookup(index) {
                    Some(TypeData::Literal(LiteralValue::Number(n))) => {
                        let i = n.value();
                        if i >= 0.0 && i.fract() == 0.0 {
                            elements.get(i as usize).copied().unwrap_or(TypeId::VOID)
                        } else {
                            TypeId::ERROR
                        }
                    }
                    _ => interner.union(elements.to_vec()),
                }
            }
            Some(
                TypeData::Mapped(_)
                | TypeData::Conditional(_)
                | TypeData::Spread(..)
                | TypeData::Diff(..)
                | TypeData::KeyOf(_),
            ) => ty,
            _ => TypeId::ERROR,
        }
    }
}
