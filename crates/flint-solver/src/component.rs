//! `React.AbstractComponent` modelling.
//!
//! A component type records what callers pass (`config`), what the
//! implementation receives (`props`), the ref instance and what it renders.
//! Higher-order components are ordinary generic functions over component
//! types; the helpers here build the props transforms they declare.

use crate::def::TypeResolver;
use crate::errors::{ArityKind, ArityTarget, CheckError, CheckResult};
use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::iterators::iterable_of;
use crate::objects::{mark_optional, omit_keys};
use crate::types::*;
use flint_common::Atom;
use flint_common::limits::MAX_COMPONENT_TYPE_ARGS;
use tracing::debug;

pub const ABSTRACT_COMPONENT: &str = "React.AbstractComponent";

/// How a component declaration constrains what it renders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RendersMode {
    /// `renders T`
    Exactly,
    /// `renders? T`: also nothing (`null`, `void`, `boolean`).
    Maybe,
    /// `renders* T`: any number, nested in iterables.
    Star,
}

/// `React.AbstractComponent<Config, Instance = mixed, Renders = React.Node>`.
pub fn abstract_component(interner: &TypeInterner, args: &[TypeId]) -> CheckResult<TypeId> {
    if args.len() > MAX_COMPONENT_TYPE_ARGS {
        return Err(CheckError::Arity {
            name: ABSTRACT_COMPONENT.to_string(),
            expected: MAX_COMPONENT_TYPE_ARGS,
            got: args.len(),
            kind: ArityKind::TooMany,
            target: ArityTarget::TypeArguments,
        });
    }
    let Some(&config) = args.first() else {
        return Err(CheckError::Arity {
            name: ABSTRACT_COMPONENT.to_string(),
            expected: 1,
            got: 0,
            kind: ArityKind::TooFew,
            target: ArityTarget::TypeArguments,
        });
    };
    let instance = args.get(1).copied().unwrap_or(TypeId::UNKNOWN);
    let renders = args.get(2).copied().unwrap_or(TypeId::REACT_NODE);
    Ok(interner.component(ComponentType {
        props: config,
        instance,
        config,
        renders,
    }))
}

/// The renders type of a component declaration.
pub fn renders_type(interner: &TypeInterner, mode: RendersMode, rendered: TypeId) -> TypeId {
    match mode {
        RendersMode::Exactly => rendered,
        RendersMode::Maybe => interner.union(vec![
            rendered,
            TypeId::NULL,
            TypeId::VOID,
            TypeId::BOOLEAN,
        ]),
        RendersMode::Star => interner.union(vec![
            rendered,
            TypeId::NULL,
            TypeId::VOID,
            TypeId::BOOLEAN,
            iterable_of(interner, rendered),
        ]),
    }
}

/// Make every key of `defaults` optional in `props`.
///
/// `props` and `defaults` must evaluate to objects; anything else (a
/// generic `Props`) leaves `props` unchanged.
pub fn props_with_defaults<R: TypeResolver + ?Sized>(
    evaluator: &mut TypeEvaluator<'_, R>,
    props: TypeId,
    defaults: TypeId,
) -> TypeId {
    let (Some(shape), Some(defaults)) = (
        evaluator.resolve_object_shape(props),
        evaluator.resolve_object_shape(defaults),
    ) else {
        debug!(props = props.0, "defaultProps on non-concrete props, ignored");
        return props;
    };
    let keys: Vec<Atom> = defaults.properties.iter().map(|p| p.name).collect();
    evaluator
        .interner()
        .object_with_shape(mark_optional(&shape, &keys))
}

/// `component` with `defaultProps` applied to its config; the props the
/// implementation sees are unchanged.
pub fn with_default_props<R: TypeResolver + ?Sized>(
    evaluator: &mut TypeEvaluator<'_, R>,
    component: &ComponentType,
    defaults: TypeId,
) -> TypeId {
    let config = props_with_defaults(evaluator, component.props, defaults);
    evaluator.interner().component(ComponentType {
        config,
        ..*component
    })
}

/// Additive HOC transform: `{...props, ...extra}`.
pub fn extend_props(interner: &TypeInterner, props: TypeId, extra: TypeId) -> TypeId {
    interner.spread(vec![props, extra], true)
}

/// Subtractive HOC transform: `props` without `keys`.
pub fn remove_props<R: TypeResolver + ?Sized>(
    evaluator: &mut TypeEvaluator<'_, R>,
    props: TypeId,
    keys: &[Atom],
) -> Option<TypeId> {
    let shape = evaluator.resolve_object_shape(props)?;
    Some(evaluator.interner().object_with_shape(omit_keys(&shape, keys)))
}

/// View `ty` as a component, if it is one.
///
/// Function components take their props as the first parameter and render
/// their return type; their instance is `void`.
pub fn component_of<R: TypeResolver + ?Sized>(
    evaluator: &mut TypeEvaluator<'_, R>,
    ty: TypeId,
) -> Option<ComponentType> {
    let interner = evaluator.interner();
    let evaluated = evaluator.evaluate(ty);
    match interner.lookup(evaluated)? {
        TypeData::Component(component) => Some(component),
        TypeData::Function(fn_id) => {
            let shape = interner.function_shape(fn_id);
            if shape.params.iter().skip(1).any(|p| !p.optional && !p.rest) {
                return None;
            }
            let props = shape
                .params
                .first()
                .map_or_else(|| interner.object(Vec::new()), |p| p.type_id);
            Some(ComponentType {
                props,
                instance: TypeId::VOID,
                config: props,
                renders: shape.return_type,
            })
        }
        TypeData::Intersection(list) => {
            let members = interner.declared_members(evaluated, list);
            members
                .iter()
                .find_map(|&member| component_of(evaluator, member))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/component_tests.rs"]
mod tests;
