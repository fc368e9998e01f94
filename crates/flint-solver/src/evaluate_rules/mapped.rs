//! Mapped type evaluation.
//!
//! A mapped type is either *eager* or *deferred*. It becomes eager when its
//! key set can be enumerated (the properties of a concrete object for
//! `keyof O`, or a union of string literals) and every per-key value is
//! concrete; the result is then a plain object type. Otherwise the node is
//! returned unchanged and re-enters evaluation after substitution.
//!
//! Homomorphic mapped types (`[K in keyof O]`) inherit optionality,
//! variance, method-ness and exactness from `O` unless a modifier
//! overrides them. A variance modifier that contradicts a one-sided source
//! property cannot be represented, so the property becomes `mixed`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::*;
use crate::visitor::contains_type_parameters;
use flint_common::Atom;
use flint_common::limits::MAX_MAPPED_KEYS;
use tracing::trace;

/// One enumerated key of a mapped type.
struct MappedKey {
    name: Atom,
    source: Option<PropertyInfo>,
}

/// Enumerated key set.
struct KeySet {
    keys: Vec<MappedKey>,
    indexer: Option<IndexSignature>,
    exact: bool,
}

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_mapped(&mut self, ty: TypeId, mapped: &MappedType) -> TypeId {
        let Some(key_set) = self.enumerate_mapped_keys(mapped) else {
            trace!(type_id = ty.0, "mapped: key set not enumerable, deferring");
            return ty;
        };
        if key_set.keys.len() > MAX_MAPPED_KEYS {
            return ty;
        }

        let interner = self.interner();
        let mut properties = Vec::with_capacity(key_set.keys.len());
        for key in &key_set.keys {
            let key_type = interner.literal_string_atom(key.name);
            let value = self.mapped_value(mapped, key_type);
            if contains_type_parameters(interner, value) {
                trace!(type_id = ty.0, "mapped: value not concrete, deferring");
                return ty;
            }
            properties.push(self.mapped_property(mapped, key, value));
        }

        let indexer = match &key_set.indexer {
            Some(source) => {
                let value = self.mapped_value(mapped, source.key_type);
                if contains_type_parameters(interner, value) {
                    return ty;
                }
                let (variance, value) = apply_variance(mapped.variance, source.variance, value);
                Some(IndexSignature {
                    key_type: source.key_type,
                    value_type: value,
                    variance,
                })
            }
            None => None,
        };

        interner.object_with_shape(ObjectShape {
            properties,
            indexer,
            exact: key_set.exact,
        })
    }

    fn enumerate_mapped_keys(&mut self, mapped: &MappedType) -> Option<KeySet> {
        let interner = self.interner();
        match mapped.source {
            KeySource::KeyOf(object) => {
                let shape = self.resolve_object_shape(object)?;
                Some(KeySet {
                    keys: shape
                        .properties
                        .iter()
                        .map(|p| MappedKey {
                            name: p.name,
                            source: Some(p.clone()),
                        })
                        .collect(),
                    indexer: shape.indexer.clone(),
                    exact: shape.exact,
                })
            }
            KeySource::Keys(keys) => {
                let keys = self.evaluate(keys);
                let mut set = KeySet {
                    keys: Vec::new(),
                    indexer: None,
                    exact: true,
                };
                for member in interner.union_members(keys) {
                    match interner.lookup(member) {
                        Some(TypeData::Literal(LiteralValue::String(name))) => {
                            set.keys.push(MappedKey { name, source: None });
                        }
                        Some(TypeData::Intrinsic(IntrinsicKind::String | IntrinsicKind::Number)) => {
                            set.indexer = Some(IndexSignature {
                                key_type: member,
                                value_type: TypeId::UNKNOWN,
                                variance: Variance::ReadWrite,
                            });
                        }
                        Some(TypeData::Intrinsic(IntrinsicKind::Never)) => {}
                        _ => return None,
                    }
                }
                Some(set)
            }
        }
    }

    fn mapped_value(&mut self, mapped: &MappedType, key_type: TypeId) -> TypeId {
        let mut subst = TypeSubstitution::new();
        subst.insert(mapped.key_param.name, key_type);
        let value = instantiate_type(self.interner(), mapped.template, &subst);
        self.evaluate(value)
    }

    fn mapped_property(&self, mapped: &MappedType, key: &MappedKey, value: TypeId) -> PropertyInfo {
        let inherited_optional = key.source.as_ref().is_some_and(|p| p.optional);
        let inherited_variance = key
            .source
            .as_ref()
            .map_or(Variance::ReadWrite, |p| p.variance);
        let optional = match mapped.optional {
            Some(MappedModifier::Add) => true,
            Some(MappedModifier::Remove) => false,
            None => inherited_optional,
        };
        let (variance, type_id) = apply_variance(mapped.variance, inherited_variance, value);
        let is_method = key
            .source
            .as_ref()
            .is_some_and(|p| p.is_method && p.type_id == type_id);
        PropertyInfo {
            name: key.name,
            type_id,
            optional,
            variance,
            is_method,
        }
    }
}

/// Combine a variance modifier with the inherited variance.
fn apply_variance(
    modifier: Option<Variance>,
    inherited: Variance,
    value: TypeId,
) -> (Variance, TypeId) {
    match modifier {
        None => (inherited, value),
        Some(requested) => {
            let conflicting = inherited != Variance::ReadWrite
                && requested != Variance::ReadWrite
                && inherited != requested;
            if conflicting {
                (requested, TypeId::UNKNOWN)
            } else {
                (requested, value)
            }
        }
    }
}
