//! Expression checking.
//!
//! `check_expr` computes the type of an expression, records it for
//! type-at-position queries and reports what is wrong with it. `expected`
//! is the contextual type: it types unannotated callback parameters, keeps
//! literal types in object literals and picks element types for array
//! literals. It is never checked here; callers compare the result against
//! whatever the expression flows into.

use crate::scope::BindingFlags;
use crate::state::CheckerState;
use flint_ast::{BinaryOp, Expr, ExprKind, LogicalOp, ObjectProp, TypeNode, UnaryOp};
use flint_common::{Atom, Span};
use flint_common::limits::MAX_EXPR_CHECK_DEPTH;
use flint_solver::component::{component_of, with_default_props};
use flint_solver::{
    ArityKind, ArityTarget, BuiltinKind, CheckError, CheckResult, FunctionShape, InferenceContext,
    ObjectShape, PropertyAccess, PropertyInfo, SubtypeFailureReason, TypeData, TypeEvaluator, TypeGuard, TypeId,
    TypeSubstitution, TypeofKind, instantiate_params, instantiate_type,
};
use tracing::{debug, trace};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

fn is_function_expr(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Function(_))
}

/// Name of a callee for arity messages.
fn callee_name(callee: &Expr) -> String {
    match &callee.kind {
        ExprKind::Ident { name } => name.clone(),
        ExprKind::Member { object, property, .. } => format!("{}.{property}", callee_name(object)),
        _ => "function".to_string(),
    }
}

impl<'a> CheckerState<'a> {
    pub(crate) fn check_expr(&mut self, expr: &Expr, expected: Option<TypeId>) -> CheckResult<TypeId> {
        if self.expr_depth >= MAX_EXPR_CHECK_DEPTH {
            debug!(depth = self.expr_depth, "expression nesting limit reached");
            return Ok(TypeId::ERROR);
        }
        self.expr_depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.check_expr_inner(expr, expected)
        });
        self.expr_depth -= 1;
        let ty = result?;
        self.record_type(expr.span, ty);
        Ok(ty)
    }

    fn check_expr_inner(&mut self, expr: &Expr, expected: Option<TypeId>) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        match &expr.kind {
            ExprKind::Ident { name } => Ok(self.check_ident(name, expr.span)),
            ExprKind::Null => Ok(TypeId::NULL),
            ExprKind::Bool { value } => Ok(interner.literal_boolean(*value)),
            ExprKind::Number { value } => Ok(interner.literal_number(*value)),
            ExprKind::String { value } => Ok(interner.literal_string(value)),
            ExprKind::Object { properties } => self.check_object(properties, expected),
            ExprKind::Array { elements } => self.check_array(elements, expected),
            ExprKind::Member {
                object,
                property,
                property_span,
            } => self.check_member(object, property, *property_span, expr.span),
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => self.check_call(callee, type_args.as_deref(), args, expr.span),
            ExprKind::New {
                callee,
                type_args,
                args,
            } => self.check_new(callee, type_args.as_deref(), args, expr.span),
            ExprKind::Function(func) => self.check_function(func, expected),
            ExprKind::Await { argument } => {
                let ty = self.check_expr(argument, None)?;
                // Closures may run while the function is suspended.
                self.havoc_captured();
                Ok(self.await_type(ty))
            }
            ExprKind::Yield { argument, delegate } => self.check_yield(argument.as_deref(), *delegate, expr.span),
            ExprKind::Cast { expr: inner, annotation } => {
                let target = self.lower(annotation)?;
                let ty = self.check_expr(inner, Some(target))?;
                self.check_assignable(ty, target, inner.span);
                Ok(target)
            }
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right),
            ExprKind::Logical { op, left, right } => self.check_logical(*op, left, right, expected),
            ExprKind::Unary { op, argument } => {
                let ty = self.check_expr(argument, None)?;
                Ok(match op {
                    UnaryOp::Not => TypeId::BOOLEAN,
                    UnaryOp::Typeof => TypeId::STRING,
                    UnaryOp::Void => TypeId::VOID,
                    UnaryOp::Minus => {
                        self.check_assignable(ty, TypeId::NUMBER, argument.span);
                        TypeId::NUMBER
                    }
                })
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.check_expr(test, None)?;
                let before = self.refinements.snapshot();
                self.refinements.enter();
                self.apply_condition(test, true);
                let then_ty = self.check_expr(consequent, expected);
                self.refinements.restore(before.clone());
                let then_ty = then_ty?;
                self.refinements.enter();
                self.apply_condition(test, false);
                let else_ty = self.check_expr(alternate, expected);
                self.refinements.restore(before);
                Ok(interner.union2(then_ty, else_ty?))
            }
            ExprKind::Assign { target, value } => self.check_assign(target, value),
            ExprKind::Jsx(element) => self.check_jsx(element, expr.span),
        }
    }

    fn check_ident(&mut self, name: &str, span: Span) -> TypeId {
        match self.scopes.lookup(name) {
            Some(id) => self.binding_type(id),
            None if name == "undefined" => TypeId::VOID,
            None => {
                let name = self.atom(name);
                self.error(span, CheckError::UnresolvedName { name });
                TypeId::ERROR
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    /// Object literals are exact. Without a contextual type their property
    /// types are widened; spreads are composed right to left.
    fn check_object(&mut self, properties: &[ObjectProp], expected: Option<TypeId>) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let expected_shape = expected.and_then(|ty| {
            let view = self.view();
            TypeEvaluator::new(interner, &view).resolve_object_shape(ty)
        });
        let mut operands = Vec::new();
        let mut current: Vec<PropertyInfo> = Vec::new();

        for prop in properties {
            let (key, span, ty, prop_expected) = match prop {
                ObjectProp::Init {
                    key,
                    key_span,
                    value,
                } => {
                    let atom = interner.intern_string(key);
                    let prop_expected = self.expected_property(expected_shape.as_deref(), atom);
                    let ty = self.check_expr(value, prop_expected)?;
                    (atom, *key_span, ty, prop_expected)
                }
                ObjectProp::Shorthand { name } => {
                    let atom = interner.intern_string(&name.name);
                    let ty = self.check_ident(&name.name, name.span);
                    (atom, name.span, ty, self.expected_property(expected_shape.as_deref(), atom))
                }
                ObjectProp::Spread { argument } => {
                    if !current.is_empty() {
                        operands.push(interner.object(std::mem::take(&mut current)));
                    }
                    operands.push(self.check_expr(argument, None)?);
                    continue;
                }
            };
            let ty = self.contextual_property_type(ty, prop_expected, expected.is_some());
            self.record_type(span, ty);
            current.retain(|p| p.name != key);
            current.push(PropertyInfo::new(key, ty));
        }

        let literal = if operands.is_empty() {
            interner.object(current)
        } else {
            if !current.is_empty() {
                operands.push(interner.object(current));
            }
            trace!(operands = operands.len(), "object literal spread");
            self.evaluate(interner.spread(operands, true))
        };
        Ok(self.with_omitted_optionals(literal, expected_shape.as_deref()))
    }

    pub(crate) fn expected_property(&self, shape: Option<&ObjectShape>, key: Atom) -> Option<TypeId> {
        shape.and_then(|shape| shape.property(key)).map(|p| p.type_id)
    }

    /// Type of a literal property value under its contextual property.
    ///
    /// A value that fits the declared property takes the declared type, so
    /// invariant properties compare equal. Values without a contextual
    /// property keep their literal type only inside some other context.
    pub(crate) fn contextual_property_type(
        &self,
        ty: TypeId,
        declared: Option<TypeId>,
        in_context: bool,
    ) -> TypeId {
        match declared {
            Some(declared) if self.is_subtype(ty, declared) => declared,
            Some(_) => self.widen(ty),
            None if in_context => ty,
            None => self.widen(ty),
        }
    }

    /// Optional keys of an exact contextual object that the literal leaves
    /// out are added to the literal's type as optional.
    pub(crate) fn with_omitted_optionals(&self, literal: TypeId, expected: Option<&ObjectShape>) -> TypeId {
        let interner = self.ctx.interner;
        let Some(expected) = expected.filter(|shape| shape.exact) else {
            return literal;
        };
        let Some(shape) = interner.object_shape_of(literal).filter(|shape| shape.exact) else {
            return literal;
        };
        let omitted: Vec<PropertyInfo> = expected
            .properties
            .iter()
            .filter(|p| p.optional && !shape.has_key(p.name))
            .cloned()
            .collect();
        if omitted.is_empty() {
            return literal;
        }
        let mut filled = (*shape).clone();
        filled.properties.extend(omitted);
        interner.object_with_shape(filled)
    }

    fn check_array(&mut self, elements: &[Expr], expected: Option<TypeId>) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let expected_data = expected.and_then(|ty| interner.lookup(self.evaluate(ty)));
        match expected_data {
            Some(TypeData::Array { element, .. }) => {
                for expr in elements {
                    let ty = self.check_expr(expr, Some(element))?;
                    self.check_assignable(ty, element, expr.span);
                }
                Ok(interner.array(element))
            }
            Some(TypeData::Tuple(list)) => {
                let slots = interner.type_list(list);
                let mut types = Vec::with_capacity(elements.len());
                for (i, expr) in elements.iter().enumerate() {
                    types.push(self.check_expr(expr, slots.get(i).copied())?);
                }
                Ok(interner.tuple(types))
            }
            _ => {
                if elements.is_empty() {
                    return Ok(interner.array(TypeId::ANY));
                }
                let mut types = Vec::with_capacity(elements.len());
                for expr in elements {
                    let ty = self.check_expr(expr, None)?;
                    types.push(self.widen(ty));
                }
                Ok(interner.array(interner.union(types)))
            }
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn check_member(&mut self, object: &Expr, property: &str, property_span: Span, span: Span) -> CheckResult<TypeId> {
        let object_ty = self.check_expr(object, None)?;
        if object_ty == TypeId::NEVER {
            return Ok(TypeId::NEVER);
        }
        let key = self.atom(property);
        let view = self.view();
        let access = TypeEvaluator::new(self.ctx.interner, &view)
            .with_max_depth(self.ctx.options.max_evaluate_depth)
            .property_of(object_ty, key);
        let ty = match access {
            PropertyAccess::Found { type_id, info } => {
                if info.is_some_and(|info| info.optional) {
                    self.ctx.interner.union2(type_id, TypeId::VOID)
                } else {
                    type_id
                }
            }
            PropertyAccess::Missing => {
                let span = if property_span.is_dummy() { span } else { property_span };
                self.error(span, CheckError::MissingProperty {
                    key,
                    on_type: object_ty,
                });
                TypeId::ERROR
            }
        };
        self.record_type(property_span, ty);
        Ok(ty)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn check_call(
        &mut self,
        callee: &Expr,
        type_args: Option<&[TypeNode]>,
        args: &[Expr],
        span: Span,
    ) -> CheckResult<TypeId> {
        let callee_ty = self.check_expr(callee, None)?;
        if callee_ty.is_any_or_error() {
            self.check_args_unchecked(args)?;
            return Ok(callee_ty);
        }
        match self.callable_shape(callee_ty) {
            Some(shape) => self.check_call_signature(&callee_name(callee), &shape, type_args, args, span),
            None => {
                self.error(callee.span, CheckError::NotCallable { ty: callee_ty });
                self.check_args_unchecked(args)?;
                Ok(TypeId::ERROR)
            }
        }
    }

    /// The signature a call of `ty` goes through; the first callable member
    /// of an intersection.
    fn callable_shape(&self, ty: TypeId) -> Option<std::sync::Arc<FunctionShape>> {
        let interner = self.ctx.interner;
        let evaluated = self.evaluate(ty);
        match interner.lookup(evaluated)? {
            TypeData::Function(fn_id) => Some(interner.function_shape(fn_id)),
            TypeData::Intersection(list) => interner
                .declared_members(evaluated, list)
                .iter()
                .find_map(|&member| self.callable_shape(member)),
            _ => None,
        }
    }

    fn check_args_unchecked(&mut self, args: &[Expr]) -> CheckResult<()> {
        for arg in args {
            self.check_expr(arg, None)?;
        }
        Ok(())
    }

    /// Type a call against `shape`: arity, explicit and inferred type
    /// arguments, then every argument against its instantiated parameter.
    pub(crate) fn check_call_signature(
        &mut self,
        name: &str,
        shape: &FunctionShape,
        type_args: Option<&[TypeNode]>,
        args: &[Expr],
        span: Span,
    ) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let required = shape.required_count();
        let max = if shape.has_rest() { usize::MAX } else { shape.params.len() };
        if args.len() < required || args.len() > max {
            let (kind, expected) = if args.len() < required {
                (ArityKind::TooFew, required)
            } else {
                (ArityKind::TooMany, shape.params.len())
            };
            self.error(span, CheckError::Arity {
                name: name.to_string(),
                expected,
                got: args.len(),
                kind,
                target: ArityTarget::Arguments,
            });
        }

        let explicit = match type_args {
            Some(nodes) => self.with_lowering(|lowering| lowering.lower_type_args(nodes))?,
            None => Vec::new(),
        };
        let generic = !shape.type_params.is_empty();

        // Non-function arguments first: they drive inference, and callbacks
        // are then typed against the instantiated parameters.
        let mut arg_types: Vec<Option<TypeId>> = vec![None; args.len()];
        for (i, arg) in args.iter().enumerate() {
            if generic && is_function_expr(arg) {
                continue;
            }
            let expected = if generic { None } else { self.param_type(shape, i) };
            arg_types[i] = Some(self.check_expr(arg, expected)?);
        }

        let mut substitution = if generic {
            self.instantiate_call(name, shape, &explicit, &arg_types, span)
        } else {
            if !explicit.is_empty() {
                self.error(span, CheckError::Arity {
                    name: name.to_string(),
                    expected: 0,
                    got: explicit.len(),
                    kind: ArityKind::TooMany,
                    target: ArityTarget::TypeArguments,
                });
            }
            None
        };

        let mut saw_callback = false;
        for (i, arg) in args.iter().enumerate() {
            if arg_types[i].is_some() {
                continue;
            }
            saw_callback = true;
            let expected = self
                .param_type(shape, i)
                .map(|ty| apply_substitution(interner, ty, substitution.as_ref()));
            arg_types[i] = Some(self.check_expr(arg, expected)?);
        }
        if generic && saw_callback {
            // Callback return types can pin down parameters still open.
            substitution = self.instantiate_call_quiet(name, shape, &explicit, &arg_types);
        }

        for (i, arg) in args.iter().enumerate() {
            let (Some(param), Some(ty)) = (self.param_type(shape, i), arg_types[i]) else {
                continue;
            };
            let param = apply_substitution(interner, param, substitution.as_ref());
            self.check_assignable(ty, param, arg.span);
        }
        Ok(apply_substitution(interner, shape.return_type, substitution.as_ref()))
    }

    /// Declared type of the `i`th argument position.
    fn param_type(&self, shape: &FunctionShape, i: usize) -> Option<TypeId> {
        let positional = shape.params.iter().filter(|p| !p.rest).count();
        if i < positional {
            return shape.params.get(i).map(|p| p.type_id);
        }
        let rest = shape.params.last().filter(|p| p.rest)?;
        match self.ctx.interner.lookup(self.evaluate(rest.type_id)) {
            Some(TypeData::Array { element, .. }) => Some(element),
            _ => Some(TypeId::ANY),
        }
    }

    fn infer_arguments(&self, shape: &FunctionShape, arg_types: &[Option<TypeId>]) -> TypeSubstitution {
        let mut inference = InferenceContext::for_params(&shape.type_params);
        self.with_checker(|checker| {
            let evaluator = checker.evaluator();
            for (i, ty) in arg_types.iter().enumerate() {
                if let (Some(ty), Some(param)) = (*ty, self.param_type(shape, i)) {
                    inference.infer(evaluator, ty, param);
                }
            }
        });
        inference.resolve(self.ctx.interner, true)
    }

    fn instantiate_call(
        &mut self,
        name: &str,
        shape: &FunctionShape,
        explicit: &[TypeId],
        arg_types: &[Option<TypeId>],
        span: Span,
    ) -> Option<TypeSubstitution> {
        let inferred = self.infer_arguments(shape, arg_types);
        let result = self.with_checker(|checker| {
            instantiate_params(checker, name, &shape.type_params, explicit, Some(&inferred))
        });
        match result {
            Ok(instantiation) => {
                for violation in instantiation.violations {
                    self.error(span, violation);
                }
                Some(instantiation.substitution)
            }
            Err(err) => {
                self.error(span, err);
                None
            }
        }
    }

    /// Re-instantiate after callbacks are typed; errors were already
    /// reported by the first instantiation.
    fn instantiate_call_quiet(
        &self,
        name: &str,
        shape: &FunctionShape,
        explicit: &[TypeId],
        arg_types: &[Option<TypeId>],
    ) -> Option<TypeSubstitution> {
        let inferred = self.infer_arguments(shape, arg_types);
        self.with_checker(|checker| {
            instantiate_params(checker, name, &shape.type_params, explicit, Some(&inferred))
        })
        .ok()
        .map(|instantiation| instantiation.substitution)
    }

    fn check_new(
        &mut self,
        callee: &Expr,
        type_args: Option<&[TypeNode]>,
        args: &[Expr],
        span: Span,
    ) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        if let ExprKind::Ident { name } = &callee.kind
            && self.scopes.lookup(name).is_none()
            && let Some(kind) = builtin_constructor(name)
        {
            let explicit = match type_args {
                Some(nodes) => self.with_lowering(|lowering| lowering.lower_type_args(nodes))?,
                None => Vec::new(),
            };
            self.check_args_unchecked(args)?;
            let mut type_args: Vec<TypeId> = explicit
                .into_iter()
                .map(|ty| if ty == TypeId::NONE { TypeId::ANY } else { ty })
                .collect();
            type_args.resize(kind.arity(), TypeId::ANY);
            return Ok(interner.builtin(kind, type_args));
        }

        let callee_ty = self.check_expr(callee, None)?;
        if callee_ty.is_any_or_error() {
            self.check_args_unchecked(args)?;
            return Ok(callee_ty);
        }
        match interner.lookup(self.evaluate(callee_ty)) {
            Some(TypeData::Class(def_id)) => {
                let instance = interner.instance(def_id);
                match self.constructors.get(&def_id).copied() {
                    Some(ctor) => {
                        let Some(shape) = self.callable_shape(ctor) else {
                            return Ok(instance);
                        };
                        self.check_call_signature(&callee_name(callee), &shape, type_args, args, span)?;
                    }
                    None => self.check_args_unchecked(args)?,
                }
                Ok(instance)
            }
            _ => {
                self.error(callee.span, CheckError::NotCallable { ty: callee_ty });
                self.check_args_unchecked(args)?;
                Ok(TypeId::ERROR)
            }
        }
    }

    // =========================================================================
    // Generators
    // =========================================================================

    fn check_yield(&mut self, argument: Option<&Expr>, delegate: bool, span: Span) -> CheckResult<TypeId> {
        let expected = self.functions.last().and_then(|frame| frame.expected_yield);
        let mut yielded = match argument {
            Some(argument) => self.check_expr(argument, if delegate { None } else { expected })?,
            None => TypeId::VOID,
        };
        if delegate {
            let element = self.with_checker(|checker| checker.evaluator().element_type_of(yielded));
            let at = argument.map_or(span, |argument| argument.span);
            yielded = self.recover(at, element, TypeId::ANY)?;
        }
        if let Some(expected) = expected {
            let at = argument.map_or(span, |argument| argument.span);
            self.check_assignable(yielded, expected, at);
        }
        let next = match self.functions.last_mut() {
            Some(frame) => {
                frame.yields.push(yielded);
                frame.next_type
            }
            None => TypeId::ANY,
        };
        self.havoc_captured();
        Ok(next)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn check_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> CheckResult<TypeId> {
        let left_ty = self.check_expr(left, None)?;
        let right_ty = self.check_expr(right, None)?;
        Ok(match op {
            BinaryOp::StrictEq
            | BinaryOp::StrictNotEq
            | BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq
            | BinaryOp::InstanceOf
            | BinaryOp::In => TypeId::BOOLEAN,
            BinaryOp::Add => {
                if left_ty.is_any_or_error() || right_ty.is_any_or_error() {
                    TypeId::ANY
                } else if self.is_subtype(left_ty, TypeId::STRING) || self.is_subtype(right_ty, TypeId::STRING) {
                    TypeId::STRING
                } else {
                    self.check_assignable(left_ty, TypeId::NUMBER, left.span);
                    self.check_assignable(right_ty, TypeId::NUMBER, right.span);
                    TypeId::NUMBER
                }
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                self.check_assignable(left_ty, TypeId::NUMBER, left.span);
                self.check_assignable(right_ty, TypeId::NUMBER, right.span);
                TypeId::NUMBER
            }
        })
    }

    /// `a && b` / `a || b` / `a ?? b`: the right operand is checked under
    /// the refinement that makes it run.
    fn check_logical(
        &mut self,
        op: LogicalOp,
        left: &Expr,
        right: &Expr,
        expected: Option<TypeId>,
    ) -> CheckResult<TypeId> {
        let left_ty = self.check_expr(left, expected)?;
        let before = self.refinements.snapshot();
        self.refinements.enter();
        match op {
            LogicalOp::And => {
                self.apply_condition(left, true);
            }
            LogicalOp::Or => {
                self.apply_condition(left, false);
            }
            LogicalOp::Nullish => {}
        }
        let right_ty = self.check_expr(right, expected);
        self.refinements.restore(before);
        let right_ty = right_ty?;

        let passed_through = match op {
            LogicalOp::And => self.narrow_type(left_ty, &TypeGuard::Truthy, false),
            LogicalOp::Or => self.narrow_type(left_ty, &TypeGuard::Truthy, true),
            LogicalOp::Nullish => self.narrow_type(left_ty, &TypeGuard::Nullish, false),
        };
        Ok(self.ctx.interner.union2(passed_through, right_ty))
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    fn check_assign(&mut self, target: &Expr, value: &Expr) -> CheckResult<TypeId> {
        match &target.kind {
            ExprKind::Ident { name } => self.check_assign_binding(name, target.span, value),
            ExprKind::Member {
                object,
                property,
                property_span,
            } => self.check_assign_member(object, property, *property_span, value),
            _ => {
                self.check_expr(target, None)?;
                self.check_expr(value, None)
            }
        }
    }

    fn check_assign_binding(&mut self, name: &str, span: Span, value: &Expr) -> CheckResult<TypeId> {
        let Some(id) = self.scopes.lookup(name) else {
            let atom = self.atom(name);
            self.error(span, CheckError::UnresolvedName { name: atom });
            return self.check_expr(value, None);
        };
        let binding = self.scopes.binding(id);
        let declared = binding.declared;
        // Writes to immutable bindings are reported by the mutability pass.
        let read_only = binding.flags.intersects(BindingFlags::IMMUTABLE)
            || binding.flags.contains(BindingFlags::FUNCTION | BindingFlags::DECLARED);

        let value_ty = self.check_expr(value, Some(declared))?;
        self.record_type(span, value_ty);
        if read_only {
            return Ok(value_ty);
        }
        if self.check_assignable(value_ty, declared, value.span) {
            let refined = self.refinement_for_write(value_ty, declared);
            self.refinements.assign(id, refined);
        } else {
            self.refinements.invalidate(id);
        }
        Ok(value_ty)
    }

    /// What a binding of type `declared` holds after a write of `value`:
    /// the widened value when that still fits, so that later literal
    /// comparisons are not refined to `empty`.
    pub(crate) fn refinement_for_write(&self, value: TypeId, declared: TypeId) -> TypeId {
        if declared.is_any_or_error() {
            return declared;
        }
        let widened = self.widen(value);
        if widened != value && self.is_subtype(widened, declared) {
            widened
        } else {
            value
        }
    }

    fn check_assign_member(
        &mut self,
        object: &Expr,
        property: &str,
        property_span: Span,
        value: &Expr,
    ) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let object_ty = self.check_expr(object, None)?;
        let binding = match &object.kind {
            ExprKind::Ident { name } => self.scopes.lookup(name),
            _ => None,
        };
        if let Some(id) = binding {
            if self.scopes.binding(id).flags.contains(BindingFlags::NAMESPACE_IMPORT) {
                // Reported by the mutability pass.
                return self.check_expr(value, None);
            }
            if property == "defaultProps" {
                let view = self.view();
                let component = component_of(&mut TypeEvaluator::new(interner, &view), object_ty);
                if let Some(component) = component {
                    let defaults = self.check_expr(value, None)?;
                    let view = self.view();
                    let updated =
                        with_default_props(&mut TypeEvaluator::new(interner, &view), &component, defaults);
                    debug!(binding = id.0, "defaultProps applied to component config");
                    self.scopes.binding_mut(id).declared = updated;
                    self.refinements.invalidate(id);
                    return Ok(defaults);
                }
            }
        }

        let key = self.atom(property);
        let view = self.view();
        let access = TypeEvaluator::new(interner, &view).property_of(object_ty, key);
        match access {
            PropertyAccess::Found { type_id, info } => {
                let value_ty = self.check_expr(value, Some(type_id))?;
                self.record_type(property_span, type_id);
                let writable = info.as_ref().is_none_or(|info| info.variance.is_writable());
                if !writable && self.ctx.options.strict_read_only {
                    self.error(value.span, CheckError::IncompatibleType {
                        lower: value_ty,
                        upper: type_id,
                        trace: Some(Box::new(SubtypeFailureReason::PropertyNotWritable {
                            property: key,
                            source: object_ty,
                        })),
                    });
                } else {
                    self.check_assignable(value_ty, type_id, value.span);
                }
                Ok(value_ty)
            }
            PropertyAccess::Missing => {
                let value_ty = self.check_expr(value, None)?;
                let is_function = matches!(
                    interner.lookup(self.evaluate(object_ty)),
                    Some(TypeData::Function(_))
                );
                // Functions accept expando properties.
                if !is_function && object_ty != TypeId::NEVER {
                    self.error(property_span, CheckError::MissingProperty {
                        key,
                        on_type: object_ty,
                    });
                }
                Ok(value_ty)
            }
        }
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// Refine bindings by the outcome `sense` of `test`. Returns true when a
    /// binding is refined to `empty`, i.e. the outcome is impossible.
    pub(crate) fn apply_condition(&mut self, test: &Expr, sense: bool) -> bool {
        match &test.kind {
            ExprKind::Ident { name } => self.narrow_binding(name, &TypeGuard::Truthy, sense),
            ExprKind::Unary {
                op: UnaryOp::Not,
                argument,
            } => self.apply_condition(argument, !sense),
            ExprKind::Logical {
                op: LogicalOp::And,
                left,
                right,
            } if sense => {
                let left = self.apply_condition(left, true);
                let right = self.apply_condition(right, true);
                left || right
            }
            ExprKind::Logical {
                op: LogicalOp::Or,
                left,
                right,
            } if !sense => {
                let left = self.apply_condition(left, false);
                let right = self.apply_condition(right, false);
                left || right
            }
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::StrictEq | BinaryOp::StrictNotEq | BinaryOp::Eq | BinaryOp::NotEq => {
                    let positive = matches!(op, BinaryOp::StrictEq | BinaryOp::Eq) == sense;
                    let loose = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
                    self.apply_equality(left, right, positive, loose)
                        .or_else(|| self.apply_equality(right, left, positive, loose))
                        .unwrap_or(false)
                }
                BinaryOp::InstanceOf => {
                    let ExprKind::Ident { name } = &left.kind else {
                        return false;
                    };
                    let class = self.peek_type(right);
                    match self.ctx.interner.lookup(class) {
                        Some(TypeData::Class(def_id)) => {
                            let instance = self.ctx.interner.instance(def_id);
                            self.narrow_binding(name, &TypeGuard::Predicate(instance), sense)
                        }
                        _ => false,
                    }
                }
                _ => false,
            },
            ExprKind::Call { callee, args, .. } => {
                let Some(shape) = self.callable_shape(self.peek_type(callee)) else {
                    return false;
                };
                let Some(predicate) = &shape.predicate else {
                    return false;
                };
                match args.get(predicate.param_index as usize).map(|arg| &arg.kind) {
                    Some(ExprKind::Ident { name }) => {
                        self.narrow_binding(name, &TypeGuard::Predicate(predicate.type_id), sense)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// `subject === value` and its variants; `None` when the pair is not a
    /// refinement pattern.
    fn apply_equality(&mut self, subject: &Expr, value: &Expr, positive: bool, loose: bool) -> Option<bool> {
        let value_ty = self.literal_value_type(value)?;
        match &subject.kind {
            ExprKind::Ident { name } => {
                let guard = if loose && matches!(value_ty, TypeId::NULL | TypeId::VOID) {
                    TypeGuard::Nullish
                } else {
                    TypeGuard::LiteralEquality(value_ty)
                };
                Some(self.narrow_binding(name, &guard, positive))
            }
            ExprKind::Member {
                object, property, ..
            } => {
                let ExprKind::Ident { name } = &object.kind else {
                    return None;
                };
                let guard = TypeGuard::Discriminant {
                    property: self.atom(property),
                    value: value_ty,
                };
                Some(self.narrow_binding(name, &guard, positive))
            }
            ExprKind::Unary {
                op: UnaryOp::Typeof,
                argument,
            } => {
                let (ExprKind::Ident { name }, ExprKind::String { value }) = (&argument.kind, &value.kind) else {
                    return None;
                };
                let kind = TypeofKind::parse(value)?;
                Some(self.narrow_binding(name, &TypeGuard::Typeof(kind), positive))
            }
            _ => None,
        }
    }

    /// Singleton type of a literal operand.
    fn literal_value_type(&self, expr: &Expr) -> Option<TypeId> {
        let interner = self.ctx.interner;
        Some(match &expr.kind {
            ExprKind::Null => TypeId::NULL,
            ExprKind::Ident { name } if name == "undefined" && self.scopes.lookup(name).is_none() => TypeId::VOID,
            ExprKind::String { value } => interner.literal_string(value),
            ExprKind::Number { value } => interner.literal_number(*value),
            ExprKind::Bool { value } => interner.literal_boolean(*value),
            _ => return None,
        })
    }

    /// Type of a name or member chain without reporting anything.
    fn peek_type(&self, expr: &Expr) -> TypeId {
        match &expr.kind {
            ExprKind::Ident { name } => self
                .scopes
                .lookup(name)
                .map_or(TypeId::ERROR, |id| self.binding_type(id)),
            ExprKind::Member { object, property, .. } => {
                let object = self.peek_type(object);
                let view = self.view();
                TypeEvaluator::new(self.ctx.interner, &view)
                    .property_of(object, self.atom(property))
                    .type_id()
                    .unwrap_or(TypeId::ERROR)
            }
            _ => TypeId::ERROR,
        }
    }

    fn narrow_binding(&mut self, name: &str, guard: &TypeGuard, sense: bool) -> bool {
        let Some(id) = self.scopes.lookup(name) else {
            return false;
        };
        let current = self.binding_type(id);
        let narrowed = self.narrow_type(current, guard, sense);
        trace!(name, from = current.0, to = narrowed.0, sense, "narrow binding");
        self.refinements.refine(id, narrowed);
        narrowed == TypeId::NEVER && current != TypeId::NEVER && !current.is_any_or_error()
    }
}

fn builtin_constructor(name: &str) -> Option<BuiltinKind> {
    match name {
        "Map" => Some(BuiltinKind::Map),
        "Set" => Some(BuiltinKind::Set),
        "Promise" => Some(BuiltinKind::Promise),
        _ => None,
    }
}

fn apply_substitution(
    interner: &flint_solver::TypeInterner,
    ty: TypeId,
    substitution: Option<&TypeSubstitution>,
) -> TypeId {
    match substitution {
        Some(substitution) if !substitution.is_empty() => instantiate_type(interner, ty, substitution),
        _ => ty,
    }
}

#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod tests;
