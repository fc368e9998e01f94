//! Function subtyping: contravariant parameters, covariant return.
//!
//! A source may take fewer parameters than the target passes, but not
//! require more. A target returning `void` accepts any source return.
//! Generic sources are compared after mapping their type parameters onto
//! the target's (same count) or erasing them to `any`.

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::subtype::{RuleResult, SubtypeChecker};
use crate::types::*;

/// Replace a signature's own type parameters with `args` (or `any`).
pub(crate) fn instantiate_signature(
    interner: &TypeInterner,
    shape: &FunctionShape,
    args: Option<&[TypeId]>,
) -> FunctionShape {
    if shape.type_params.is_empty() {
        return shape.clone();
    }
    let mut subst = TypeSubstitution::new();
    for (i, param) in shape.type_params.iter().enumerate() {
        let arg = args.and_then(|a| a.get(i).copied()).unwrap_or(TypeId::ANY);
        subst.insert(param.name, arg);
    }
    FunctionShape {
        type_params: Vec::new(),
        params: shape
            .params
            .iter()
            .map(|p| ParamInfo {
                type_id: instantiate_type(interner, p.type_id, &subst),
                ..p.clone()
            })
            .collect(),
        return_type: instantiate_type(interner, shape.return_type, &subst),
        predicate: shape.predicate.as_ref().map(|pred| TypePredicate {
            param_index: pred.param_index,
            type_id: instantiate_type(interner, pred.type_id, &subst),
        }),
    }
}

fn rest_element(interner: &TypeInterner, rest: &ParamInfo) -> TypeId {
    match interner.lookup(rest.type_id) {
        Some(TypeData::Array { element, .. }) => element,
        _ => TypeId::ANY,
    }
}

impl<R: TypeResolver + ?Sized> SubtypeChecker<'_, R> {
    pub(crate) fn check_function_subtype(
        &mut self,
        s: TypeId,
        s_fn: &FunctionShape,
        t: TypeId,
        t_fn: &FunctionShape,
    ) -> RuleResult {
        let interner = self.interner;
        let s_fn = if !s_fn.type_params.is_empty()
            && s_fn.type_params.len() == t_fn.type_params.len()
        {
            let targets: Vec<TypeId> = t_fn
                .type_params
                .iter()
                .map(|p| interner.type_param(p.clone()))
                .collect();
            instantiate_signature(interner, s_fn, Some(&targets))
        } else {
            instantiate_signature(interner, s_fn, None)
        };

        let t_fixed: Vec<&ParamInfo> = t_fn.params.iter().filter(|p| !p.rest).collect();
        let s_fixed: Vec<&ParamInfo> = s_fn.params.iter().filter(|p| !p.rest).collect();
        let t_rest = t_fn.params.iter().find(|p| p.rest);
        let s_rest = s_fn.params.iter().find(|p| p.rest);

        let s_required = s_fn.required_count();
        if t_rest.is_none() && s_required > t_fixed.len() {
            return Err(Box::new(SubtypeFailureReason::TooFewParameters {
                source: s,
                target: t,
            }));
        }

        for (index, t_param) in t_fixed.iter().enumerate() {
            let s_param_type = match (s_fixed.get(index), s_rest) {
                (Some(p), _) => p.type_id,
                (None, Some(rest)) => rest_element(interner, rest),
                (None, None) => break,
            };
            let mut passed = t_param.type_id;
            if t_param.optional && s_fixed.get(index).is_some_and(|p| !p.optional) {
                passed = interner.union2(passed, TypeId::VOID);
            }
            self.check_subtype(passed, s_param_type).map_err(|nested| {
                Box::new(SubtypeFailureReason::ParameterMismatch { index, nested })
            })?;
        }

        if let Some(t_rest) = t_rest {
            let t_elem = rest_element(interner, t_rest);
            for (offset, s_param) in s_fixed.iter().enumerate().skip(t_fixed.len()) {
                self.check_subtype(t_elem, s_param.type_id).map_err(|nested| {
                    Box::new(SubtypeFailureReason::ParameterMismatch {
                        index: offset,
                        nested,
                    })
                })?;
            }
            if let Some(s_rest) = s_rest {
                let s_elem = rest_element(interner, s_rest);
                self.check_subtype(t_elem, s_elem).map_err(|nested| {
                    Box::new(SubtypeFailureReason::ParameterMismatch {
                        index: s_fixed.len(),
                        nested,
                    })
                })?;
            }
        }

        if t_fn.return_type == TypeId::VOID {
            return Ok(());
        }
        self.check_subtype(s_fn.return_type, t_fn.return_type)
            .map_err(|nested| Box::new(SubtypeFailureReason::ReturnMismatch { nested }))
    }
}
