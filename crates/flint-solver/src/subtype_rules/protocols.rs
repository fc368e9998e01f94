//! Arrays, tuples, built-in containers, iterators and components.

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::iterators::ITERATOR_METHOD;
use crate::subtype::{RuleResult, SubtypeChecker, mismatch};
use crate::subtype_rules::functions::instantiate_signature;
use crate::types::*;

impl<R: TypeResolver + ?Sized> SubtypeChecker<'_, R> {
    /// Arrays are invariant unless the target is read-only; tuples are
    /// covariant per slot and convert to arrays of their slot union.
    pub(crate) fn check_array_like(
        &mut self,
        s: TypeId,
        s_data: Option<&TypeData>,
        t: TypeId,
        t_data: Option<&TypeData>,
    ) -> RuleResult {
        let interner = self.interner;
        let wrap_element =
            |nested| Box::new(SubtypeFailureReason::ArrayElementMismatch { nested });
        match (s_data, t_data) {
            (
                Some(TypeData::Array {
                    element: s_elem,
                    readonly: s_ro,
                }),
                Some(TypeData::Array {
                    element: t_elem,
                    readonly: t_ro,
                }),
            ) => {
                if *s_ro && !*t_ro {
                    return Err(Box::new(SubtypeFailureReason::ReadOnlyConversion {
                        source: s,
                        target: t,
                    }));
                }
                self.check_subtype(*s_elem, *t_elem).map_err(wrap_element)?;
                if !*t_ro {
                    self.check_subtype(*t_elem, *s_elem).map_err(wrap_element)?;
                }
                Ok(())
            }
            (Some(TypeData::Tuple(list)), Some(TypeData::Array { element, .. })) => {
                let slots = interner.type_list(*list);
                for &slot in slots.iter() {
                    self.check_subtype(slot, *element).map_err(wrap_element)?;
                }
                Ok(())
            }
            (Some(TypeData::Tuple(s_list)), Some(TypeData::Tuple(t_list))) => {
                let s_slots = interner.type_list(*s_list);
                let t_slots = interner.type_list(*t_list);
                if s_slots.len() != t_slots.len() {
                    return Err(Box::new(SubtypeFailureReason::TupleArity {
                        source_len: s_slots.len(),
                        target_len: t_slots.len(),
                    }));
                }
                for (index, (&a, &b)) in s_slots.iter().zip(t_slots.iter()).enumerate() {
                    self.check_subtype(a, b).map_err(|nested| {
                        Box::new(SubtypeFailureReason::TupleElementMismatch { index, nested })
                    })?;
                }
                Ok(())
            }
            _ => Err(mismatch(s, t)),
        }
    }

    /// `Map` and `Set` are invariant in their arguments, `Promise` covariant.
    pub(crate) fn check_builtin(
        &mut self,
        kind: BuiltinKind,
        s_list: TypeListId,
        t_list: TypeListId,
    ) -> RuleResult {
        let s_args = self.interner.type_list(s_list);
        let t_args = self.interner.type_list(t_list);
        let names: &[&'static str] = match kind {
            BuiltinKind::Map => &["K", "V"],
            BuiltinKind::Set | BuiltinKind::Promise => &["T"],
        };
        for (i, (&a, &b)) in s_args.iter().zip(t_args.iter()).enumerate() {
            let name = names.get(i).copied().unwrap_or("T");
            if kind == BuiltinKind::Promise {
                self.check_subtype(a, b).map_err(|nested| {
                    Box::new(SubtypeFailureReason::TypeArgumentMismatch { name, nested })
                })?;
            } else {
                self.check_invariant(a, b, name)?;
            }
        }
        Ok(())
    }

    /// Yield and return are covariant, next is contravariant.
    pub(crate) fn check_iterator(&mut self, s: &IteratorType, t: &IteratorType) -> RuleResult {
        let wrap = |name| {
            move |nested| Box::new(SubtypeFailureReason::TypeArgumentMismatch { name, nested })
        };
        self.check_subtype(s.yield_type, t.yield_type)
            .map_err(wrap("Yield"))?;
        self.check_subtype(s.return_type, t.return_type)
            .map_err(wrap("Return"))?;
        self.check_subtype(t.next_type, s.next_type)
            .map_err(wrap("Next"))
    }

    /// Config is contravariant; instance and renders are covariant.
    pub(crate) fn check_component(&mut self, s: &ComponentType, t: &ComponentType) -> RuleResult {
        let wrap = |name| {
            move |nested| Box::new(SubtypeFailureReason::TypeArgumentMismatch { name, nested })
        };
        self.check_subtype(t.config, s.config).map_err(wrap("Config"))?;
        self.check_subtype(s.instance, t.instance)
            .map_err(wrap("Instance"))?;
        self.check_subtype(s.renders, t.renders)
            .map_err(wrap("Renders"))
    }

    /// A function component: `(props: P) => R` against
    /// `AbstractComponent<Config, Instance, Renders>`.
    pub(crate) fn check_function_component(
        &mut self,
        s_fn: &FunctionShape,
        t: &ComponentType,
    ) -> RuleResult {
        let s_fn = instantiate_signature(self.interner, s_fn, None);
        let wrap = |name| {
            move |nested| Box::new(SubtypeFailureReason::TypeArgumentMismatch { name, nested })
        };
        if let Some(props) = s_fn.params.first() {
            self.check_subtype(t.config, props.type_id)
                .map_err(wrap("Config"))?;
        }
        if s_fn.params.iter().skip(1).any(|p| !p.optional && !p.rest) {
            return Err(mismatch(self.interner.function(s_fn.clone()), self.interner.component(*t)));
        }
        self.check_subtype(TypeId::VOID, t.instance)
            .map_err(wrap("Instance"))?;
        self.check_subtype(s_fn.return_type, t.renders)
            .map_err(wrap("Renders"))
    }

    /// A non-object source against an `Iterable`-like object target.
    pub(crate) fn check_iterable_target(
        &mut self,
        s: TypeId,
        t: TypeId,
        t_shape: &ObjectShape,
    ) -> RuleResult {
        let interner = self.interner;
        let method_name = interner.intern_string(ITERATOR_METHOD);
        let Some(method) = t_shape.property(method_name) else {
            return Err(mismatch(s, t));
        };
        if t_shape
            .properties
            .iter()
            .any(|p| p.name != method_name && !p.optional)
        {
            return Err(mismatch(s, t));
        }
        let method_ty = self.evaluator.evaluate(method.type_id);
        let Some(TypeData::Function(fn_id)) = interner.lookup(method_ty) else {
            return Err(mismatch(s, t));
        };
        let returned = self
            .evaluator
            .evaluate(interner.function_shape(fn_id).return_type);
        let Some(TypeData::Iterator(target_it)) = interner.lookup(returned) else {
            return Err(mismatch(s, t));
        };
        let element = match self.evaluator.element_type_of(s) {
            Ok(element) => element,
            Err(_) => return Err(mismatch(s, t)),
        };
        self.check_subtype(element, target_it.yield_type)
            .map_err(|nested| {
                Box::new(SubtypeFailureReason::IteratedElementMismatch { source: s, nested })
            })
    }
}
