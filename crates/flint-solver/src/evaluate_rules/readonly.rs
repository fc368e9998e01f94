//! `$ReadOnly<T>` and `$ReactDeepReadOnly<T>`.
//!
//! The shallow form makes every property and indexer covariant. The deep
//! form additionally wraps each nested value in a deep read-only node, which
//! is evaluated only when that value is inspected; recursive types are
//! therefore converted one level at a time.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::types::*;

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_readonly(&mut self, ty: TypeId, inner: TypeId, deep: bool) -> TypeId {
        let interner = self.interner();
        let evaluated = self.evaluate(inner);

        match interner.lookup(evaluated) {
            Some(TypeData::Object(_) | TypeData::Instance(_)) => {
                let Some(shape) = self.resolve_object_shape(evaluated) else {
                    return evaluated;
                };
                let properties = shape
                    .properties
                    .iter()
                    .map(|p| PropertyInfo {
                        type_id: if deep { self.deep_wrap(p.type_id) } else { p.type_id },
                        variance: Variance::ReadOnly,
                        ..p.clone()
                    })
                    .collect();
                let indexer = shape.indexer.as_ref().map(|idx| IndexSignature {
                    key_type: idx.key_type,
                    value_type: if deep {
                        self.deep_wrap(idx.value_type)
                    } else {
                        idx.value_type
                    },
                    variance: Variance::ReadOnly,
                });
                interner.object_with_shape(ObjectShape {
                    properties,
                    indexer,
                    exact: shape.exact,
                })
            }
            Some(TypeData::Array { element, .. }) => {
                let element = if deep { self.deep_wrap(element) } else { element };
                interner.readonly_array(element)
            }
            Some(TypeData::Tuple(list)) if deep => {
                let elements = interner.type_list(list);
                let elements = elements.iter().map(|&e| self.deep_wrap(e)).collect();
                interner.tuple(elements)
            }
            Some(TypeData::Union(list)) => {
                let members = interner.type_list(list);
                let converted = members
                    .iter()
                    .map(|&m| {
                        let wrapped = interner.readonly(m, deep);
                        self.evaluate(wrapped)
                    })
                    .collect();
                interner.union(converted)
            }
            Some(
                TypeData::TypeParameter(_)
                | TypeData::Mapped(_)
                | TypeData::Conditional(_)
                | TypeData::Spread(..)
                | TypeData::IndexAccess(..)
                | TypeData::Diff(..),
            ) => ty,
            _ => evaluated,
        }
    }

    fn deep_wrap(&mut self, child: TypeId) -> TypeId {
        let evaluated = self.evaluate(child);
        match self.interner().lookup(evaluated) {
            None
            | Some(
                TypeData::Intrinsic(_)
                | TypeData::Literal(_)
                | TypeData::Function(_)
                | TypeData::Component(_)
                | TypeData::Element(_),
            ) => evaluated,
            _ => self.interner().readonly(child, true),
        }
    }
}
