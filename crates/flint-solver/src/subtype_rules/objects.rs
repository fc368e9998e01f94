//! Object subtyping: exactness, width, optionality and property variance.
//!
//! - An exact target accepts only exact sources with the same key set. An
//!   exact source may leave out a key that is optional in an inexact target.
//! - `+p` (read-only) targets compare covariantly, `-p` (write-only)
//!   contravariantly, plain properties invariantly and require the source
//!   property to be both readable and writable.
//! - A source property that is optional cannot satisfy a required target
//!   property.

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::objects::compose;
use crate::subtype::{RuleResult, SubtypeChecker, mismatch};
use crate::types::*;

impl<R: TypeResolver + ?Sized> SubtypeChecker<'_, R> {
    pub(crate) fn check_object_subtype(
        &mut self,
        s: TypeId,
        s_shape: &ObjectShape,
        t: TypeId,
        t_shape: &ObjectShape,
    ) -> RuleResult {
        if t_shape.exact && !s_shape.exact {
            return Err(Box::new(SubtypeFailureReason::InexactToExact {
                source: s,
                target: t,
            }));
        }

        for t_prop in &t_shape.properties {
            match s_shape.property(t_prop.name) {
                Some(s_prop) => self.check_property(s, t, s_prop, t_prop)?,
                None => self.check_absent_property(s, s_shape, t, t_shape, t_prop)?,
            }
        }

        if t_shape.exact {
            if let Some(extra) = s_shape
                .properties
                .iter()
                .find(|p| !t_shape.has_key(p.name))
            {
                return Err(Box::new(SubtypeFailureReason::ExtraProperty {
                    property: extra.name,
                    target: t,
                }));
            }
        }

        if let Some(t_indexer) = &t_shape.indexer {
            self.check_indexer(s_shape, t_indexer)?;
        }
        Ok(())
    }

    fn check_absent_property(
        &mut self,
        s: TypeId,
        s_shape: &ObjectShape,
        t: TypeId,
        t_shape: &ObjectShape,
        t_prop: &PropertyInfo,
    ) -> RuleResult {
        if let Some(indexer) = &s_shape.indexer {
            if matches!(indexer.key_type, TypeId::STRING | TypeId::ANY) {
                return self
                    .check_subtype(indexer.value_type, t_prop.type_id)
                    .map_err(|nested| {
                        Box::new(SubtypeFailureReason::PropertyMismatch {
                            property: t_prop.name,
                            nested,
                        })
                    });
            }
        }
        if t_prop.optional && s_shape.exact && !t_shape.exact {
            return Ok(());
        }
        Err(Box::new(SubtypeFailureReason::MissingProperty {
            property: t_prop.name,
            source: s,
            target: t,
        }))
    }

    fn check_property(
        &mut self,
        s: TypeId,
        t: TypeId,
        s_prop: &PropertyInfo,
        t_prop: &PropertyInfo,
    ) -> RuleResult {
        let name = t_prop.name;
        if s_prop.optional && !t_prop.optional {
            return Err(Box::new(SubtypeFailureReason::OptionalProperty {
                property: name,
                source: s,
                target: t,
            }));
        }

        let wrap = |nested| Box::new(SubtypeFailureReason::PropertyMismatch { property: name, nested });
        match t_prop.variance {
            Variance::ReadOnly => {
                if !s_prop.variance.is_readable() {
                    return Err(Box::new(SubtypeFailureReason::PropertyNotReadable {
                        property: name,
                        source: s,
                    }));
                }
                self.check_subtype(s_prop.type_id, t_prop.type_id).map_err(wrap)
            }
            Variance::WriteOnly => {
                if !s_prop.variance.is_writable() {
                    return Err(Box::new(SubtypeFailureReason::PropertyNotWritable {
                        property: name,
                        source: s,
                    }));
                }
                self.check_subtype(t_prop.type_id, s_prop.type_id).map_err(wrap)
            }
            Variance::ReadWrite => {
                if !s_prop.variance.is_writable() {
                    return Err(Box::new(SubtypeFailureReason::PropertyNotWritable {
                        property: name,
                        source: s,
                    }));
                }
                if !s_prop.variance.is_readable() {
                    return Err(Box::new(SubtypeFailureReason::PropertyNotReadable {
                        property: name,
                        source: s,
                    }));
                }
                self.check_subtype(s_prop.type_id, t_prop.type_id).map_err(wrap)?;
                self.check_subtype(t_prop.type_id, s_prop.type_id).map_err(wrap)
            }
        }
    }

    fn check_indexer(&mut self, s_shape: &ObjectShape, t_indexer: &IndexSignature) -> RuleResult {
        let wrap = |nested| Box::new(SubtypeFailureReason::IndexerMismatch { nested });
        match &s_shape.indexer {
            Some(s_indexer) => {
                self.check_subtype(t_indexer.key_type, s_indexer.key_type)
                    .map_err(wrap)?;
                match t_indexer.variance {
                    Variance::ReadOnly => self
                        .check_subtype(s_indexer.value_type, t_indexer.value_type)
                        .map_err(wrap),
                    Variance::WriteOnly => self
                        .check_subtype(t_indexer.value_type, s_indexer.value_type)
                        .map_err(wrap),
                    Variance::ReadWrite => {
                        self.check_subtype(s_indexer.value_type, t_indexer.value_type)
                            .map_err(wrap)?;
                        self.check_subtype(t_indexer.value_type, s_indexer.value_type)
                            .map_err(wrap)
                    }
                }
            }
            // Named properties must fit the dictionary.
            None => {
                for prop in &s_shape.properties {
                    self.check_subtype(prop.type_id, t_indexer.value_type)
                        .map_err(wrap)?;
                }
                Ok(())
            }
        }
    }

    /// `{...$Diff<A, R>, ...objs} <: A` when `objs` puts back exactly the
    /// keys `R` took out, each at a type `A` accepts for that key.
    pub(crate) fn check_restored_spread(&mut self, s: TypeId, t: TypeId) -> Option<RuleResult> {
        let interner = self.interner;
        let Some(TypeData::Spread(list, _)) = interner.lookup(s) else {
            return None;
        };
        let operands = interner.type_list(list);
        let (&first, restored) = operands.split_first()?;
        let Some(TypeData::Diff(base, removed)) = interner.lookup(first) else {
            return None;
        };
        if base != t || restored.is_empty() {
            return None;
        }
        let removed = self.evaluator.resolve_object_shape(removed)?;
        let mut shapes = Vec::with_capacity(restored.len());
        for &operand in restored {
            shapes.push(self.evaluator.resolve_object_shape(operand)?);
        }
        let restored = compose(&shapes, false);

        let same_keys = restored.properties.len() == removed.properties.len()
            && removed.properties.iter().all(|p| restored.has_key(p.name));
        if !same_keys {
            return Some(Err(mismatch(s, t)));
        }
        for prop in &restored.properties {
            let Some(expected) = self.evaluator.property_of(t, prop.name).type_id() else {
                return Some(Err(Box::new(SubtypeFailureReason::MissingProperty {
                    property: prop.name,
                    source: s,
                    target: t,
                })));
            };
            if let Err(nested) = self.check_subtype(prop.type_id, expected) {
                return Some(Err(Box::new(SubtypeFailureReason::PropertyMismatch {
                    property: prop.name,
                    nested,
                })));
            }
        }
        Some(Ok(()))
    }
}
