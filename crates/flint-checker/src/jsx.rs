//! JSX elements.
//!
//! An element's attributes form an exact object that must be a subtype of
//! the component's config. `key` and `ref` are accepted on every component
//! and never reach the config; children arrive as the `children` prop.

use crate::state::CheckerState;
use flint_ast::{Expr, JsxAttribute, JsxElement};
use flint_common::Span;
use flint_solver::component::component_of;
use flint_solver::{
    CheckError, CheckResult, InferenceContext, PropertyAccess, PropertyInfo, TypeData, TypeEvaluator, TypeId,
    instantiate_params, instantiate_type,
};
use tracing::trace;

fn is_intrinsic(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) && !name.contains('.')
}

impl<'a> CheckerState<'a> {
    pub(crate) fn check_jsx(&mut self, element: &JsxElement, span: Span) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let at = if element.name_span.is_dummy() { span } else { element.name_span };

        if is_intrinsic(&element.name) {
            self.check_attributes(element, None)?;
            return Ok(interner.element(interner.literal_string(&element.name)));
        }

        let component_ty = self.jsx_component_type(&element.name, at);
        self.record_type(element.name_span, component_ty);
        if component_ty.is_any_or_error() {
            self.check_attributes(element, None)?;
            return Ok(interner.element(component_ty));
        }

        if let Some(config) = self.generic_component_config(element, component_ty, at)? {
            let attrs = self.check_attributes(element, Some(config))?;
            self.check_assignable(attrs, config, at);
            return Ok(interner.element(component_ty));
        }

        let view = self.view();
        let component = component_of(&mut TypeEvaluator::new(interner, &view), component_ty);
        let Some(component) = component else {
            self.error(at, CheckError::NotAComponent { ty: component_ty });
            self.check_attributes(element, None)?;
            return Ok(TypeId::ERROR);
        };
        let attrs = self.check_attributes(element, Some(component.config))?;
        self.check_assignable(attrs, component.config, at);
        Ok(interner.element(component_ty))
    }

    /// Resolve `Name` or `Namespace.Name`.
    fn jsx_component_type(&mut self, name: &str, span: Span) -> TypeId {
        let mut parts = name.split('.');
        let Some(head) = parts.next() else {
            return TypeId::ERROR;
        };
        let Some(id) = self.scopes.lookup(head) else {
            let name = self.atom(head);
            self.error(span, CheckError::UnresolvedName { name });
            return TypeId::ERROR;
        };
        let mut ty = self.binding_type(id);
        for part in parts {
            let key = self.atom(part);
            let view = self.view();
            match TypeEvaluator::new(self.ctx.interner, &view).property_of(ty, key) {
                PropertyAccess::Found { type_id, .. } => ty = type_id,
                PropertyAccess::Missing => {
                    self.error(span, CheckError::MissingProperty { key, on_type: ty });
                    return TypeId::ERROR;
                }
            }
        }
        ty
    }

    /// Config of a generic function component, with its type arguments
    /// inferred from the attributes. `None` for anything else.
    fn generic_component_config(
        &mut self,
        element: &JsxElement,
        component_ty: TypeId,
        span: Span,
    ) -> CheckResult<Option<TypeId>> {
        let interner = self.ctx.interner;
        let Some(TypeData::Function(fn_id)) = interner.lookup(self.evaluate(component_ty)) else {
            return Ok(None);
        };
        let shape = interner.function_shape(fn_id);
        if shape.type_params.is_empty() {
            return Ok(None);
        }
        let Some(props) = shape.params.first().map(|p| p.type_id) else {
            return Ok(None);
        };

        let explicit = match &element.type_args {
            Some(nodes) => self.with_lowering(|lowering| lowering.lower_type_args(nodes))?,
            None => Vec::new(),
        };
        // Attributes are checked twice; the first pass only feeds inference.
        let errors = self.errors.len();
        let spans = self.type_spans.len();
        let attrs = self.check_attributes(element, None)?;
        self.errors.truncate(errors);
        self.type_spans.truncate(spans);

        let mut inference = InferenceContext::for_params(&shape.type_params);
        self.with_checker(|checker| inference.infer(checker.evaluator(), attrs, props));
        let inferred = inference.resolve(interner, true);
        let result = self.with_checker(|checker| {
            instantiate_params(checker, &element.name, &shape.type_params, &explicit, Some(&inferred))
        });
        let instantiation = match result {
            Ok(instantiation) => instantiation,
            Err(err) => {
                self.error(span, err);
                return Ok(Some(TypeId::ERROR));
            }
        };
        for violation in instantiation.violations {
            self.error(span, violation);
        }
        trace!(component = %element.name, "generic component instantiated");
        Ok(Some(instantiate_type(interner, props, &instantiation.substitution)))
    }

    /// The attributes and children of `element` as an exact object.
    fn check_attributes(&mut self, element: &JsxElement, config: Option<TypeId>) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let config_shape = config.and_then(|config| {
            let view = self.view();
            TypeEvaluator::new(interner, &view).resolve_object_shape(config)
        });
        let mut operands = Vec::new();
        let mut current: Vec<PropertyInfo> = Vec::new();

        for attribute in &element.attributes {
            match attribute {
                JsxAttribute::Attr { name, value } => {
                    let key = interner.intern_string(&name.name);
                    match name.name.as_str() {
                        "key" => {
                            if let Some(value) = value {
                                let ty = self.check_expr(value, None)?;
                                let key_type = interner.union2(TypeId::STRING, TypeId::NUMBER);
                                self.check_assignable(ty, key_type, value.span);
                            }
                            continue;
                        }
                        "ref" => {
                            if let Some(value) = value {
                                self.check_expr(value, None)?;
                            }
                            continue;
                        }
                        _ => {}
                    }
                    let expected = self.expected_property(config_shape.as_deref(), key);
                    let ty = match value {
                        Some(value) => self.check_expr(value, expected)?,
                        None => TypeId::BOOLEAN_TRUE,
                    };
                    self.record_type(name.span, expected.unwrap_or(ty));
                    let ty = self.contextual_property_type(ty, expected, config.is_some());
                    current.retain(|p| p.name != key);
                    current.push(PropertyInfo::new(key, ty));
                }
                JsxAttribute::Spread { argument } => {
                    if !current.is_empty() {
                        operands.push(interner.object(std::mem::take(&mut current)));
                    }
                    operands.push(self.check_expr(argument, None)?);
                }
            }
        }

        if let Some(children) = self.check_children(&element.children)? {
            let key = interner.intern_string("children");
            let expected = self.expected_property(config_shape.as_deref(), key);
            let children = self.contextual_property_type(children, expected, config.is_some());
            current.retain(|p| p.name != key);
            current.push(PropertyInfo::new(key, children));
        }

        let attrs = if operands.is_empty() {
            interner.object(current)
        } else {
            if !current.is_empty() {
                operands.push(interner.object(current));
            }
            self.evaluate(interner.spread(operands, true))
        };
        Ok(self.with_omitted_optionals(attrs, config_shape.as_deref()))
    }

    /// One child is passed as is, several as an array.
    fn check_children(&mut self, children: &[Expr]) -> CheckResult<Option<TypeId>> {
        match children {
            [] => Ok(None),
            [child] => self.check_expr(child, None).map(Some),
            _ => {
                let mut types = Vec::with_capacity(children.len());
                for child in children {
                    let ty = self.check_expr(child, None)?;
                    types.push(self.widen(ty));
                }
                Ok(Some(self.ctx.interner.array(self.union(types))))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/jsx_tests.rs"]
mod tests;
