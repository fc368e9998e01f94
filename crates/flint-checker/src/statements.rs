//! Statement checking: declarations, branches, loops and function bodies.

use crate::declarations::unwrap_export;
use crate::scope::{BindingFlags, BindingId, ScopeKind};
use crate::state::{CheckerState, FunctionFrame};
use crate::walk::assigned_names_in;
use flint_ast::{
    ClassDecl, ClassMember, ComponentDecl, Expr, ExprKind, ForOf, Function, Ident, ObjectPattern, Stmt,
    StmtKind, VarDecl, VarKind,
};
use flint_solver::{
    BuiltinKind, CheckError, CheckResult, FunctionShape, IteratorType, ParamInfo, PropertyAccess,
    PropertyInfo, TypeData, TypeEvaluator, TypeId,
};
use tracing::trace;

/// How control leaves a statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Completion {
    Normal,
    /// `return`, `throw`, `break`, `continue` or a loop that never exits.
    Abrupt,
}

impl Completion {
    pub(crate) const fn falls_through(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Declarations that take effect regardless of their position.
fn is_hoisted(stmt: &Stmt) -> bool {
    matches!(
        unwrap_export(stmt).kind,
        StmtKind::FunctionDecl(_)
            | StmtKind::TypeAlias(_)
            | StmtKind::OpaqueType(_)
            | StmtKind::DeclareFunction { .. }
            | StmtKind::DeclareVar { .. }
            | StmtKind::Import(_)
            | StmtKind::ExportNamed { .. }
    )
}

/// Whether `stmt` contains a `break` for the loop around it.
fn contains_break(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block { body } => body.iter().any(contains_break),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => contains_break(consequent) || alternate.as_deref().is_some_and(contains_break),
        _ => false,
    }
}

impl<'a> CheckerState<'a> {
    /// Check a statement list whose declarations are already hoisted.
    ///
    /// Statements after one that cannot complete are not checked; the first
    /// of them is reported as unreachable.
    pub(crate) fn check_statements(&mut self, body: &[Stmt]) -> CheckResult<Completion> {
        let mut completion = Completion::Normal;
        let mut reported = false;
        for stmt in body {
            if !completion.falls_through() {
                if is_hoisted(stmt) {
                    self.check_statement(stmt)?;
                    continue;
                }
                if !reported && self.ctx.options.report_unreachable {
                    self.error(stmt.span, CheckError::UnreachableCode);
                }
                reported = true;
                continue;
            }
            completion = self.check_statement(stmt)?;
        }
        Ok(completion)
    }

    pub(crate) fn check_statement(&mut self, stmt: &Stmt) -> CheckResult<Completion> {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => {
                self.check_var_decl(decl)?;
                Ok(Completion::Normal)
            }
            StmtKind::Destructure(pattern) => {
                self.check_destructure(pattern)?;
                Ok(Completion::Normal)
            }
            StmtKind::FunctionDecl(func) => {
                let ty = self.check_function(func, None)?;
                if let Some(name) = &func.name {
                    if func.ret.is_none()
                        && let Some(id) = self.scopes.lookup(&name.name)
                    {
                        self.scopes.binding_mut(id).declared = ty;
                    }
                    self.record_type(name.span, ty);
                }
                Ok(Completion::Normal)
            }
            StmtKind::ClassDecl(class) => {
                self.check_class_body(class)?;
                Ok(Completion::Normal)
            }
            StmtKind::ComponentDecl(component) => {
                self.check_component(component)?;
                Ok(Completion::Normal)
            }
            StmtKind::DeclareFunction { .. }
            | StmtKind::DeclareVar { .. }
            | StmtKind::TypeAlias(_)
            | StmtKind::OpaqueType(_)
            | StmtKind::Import(_)
            | StmtKind::ExportNamed { .. } => Ok(Completion::Normal),
            StmtKind::Expr { expr } => {
                self.check_expr(expr, None)?;
                Ok(Completion::Normal)
            }
            StmtKind::Return { argument } => {
                self.check_return(argument.as_ref(), stmt)?;
                Ok(Completion::Abrupt)
            }
            StmtKind::Throw { argument } => {
                self.check_expr(argument, None)?;
                Ok(Completion::Abrupt)
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => self.check_if(test, consequent, alternate.as_deref()),
            StmtKind::Block { body } => self.check_block(body),
            StmtKind::ForOf(for_of) => self.check_for_of(for_of),
            StmtKind::While { test, body } => self.check_while(test, body),
            StmtKind::Break | StmtKind::Continue => Ok(Completion::Abrupt),
            StmtKind::Export { declaration } => self.check_statement(declaration),
            StmtKind::ExportDefault { expr } | StmtKind::ModuleExports { expr } => {
                let ty = self.check_expr(expr, None)?;
                self.exports.default = Some(ty);
                Ok(Completion::Normal)
            }
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn check_var_decl(&mut self, decl: &VarDecl) -> CheckResult<()> {
        let name = &decl.name;
        let id = match self.scopes.lookup(&name.name) {
            Some(id) => id,
            None => {
                let flags = BindingFlags::from_var_kind(decl.kind);
                self.scopes.declare(&name.name, flags, TypeId::ANY, name.span)
            }
        };
        let binding = self.scopes.binding(id);
        let annotated = binding
            .flags
            .contains(BindingFlags::ANNOTATED)
            .then_some(binding.declared);

        let Some(init) = &decl.init else {
            self.record_type(name.span, annotated.unwrap_or(TypeId::ANY));
            return Ok(());
        };
        let ty = self.check_expr(init, annotated)?;
        match annotated {
            Some(declared) => {
                if self.check_assignable(ty, declared, init.span) {
                    let refined = self.refinement_for_write(ty, declared);
                    self.refinements.assign(id, refined);
                }
                self.record_type(name.span, declared);
            }
            None => {
                let declared = match ty {
                    TypeId::NULL | TypeId::VOID => TypeId::ANY,
                    _ if decl.kind == flint_ast::VarKind::Const => ty,
                    _ => self.widen(ty),
                };
                self.scopes.binding_mut(id).declared = declared;
                self.refinements.invalidate(id);
                self.record_type(name.span, declared);
            }
        }
        Ok(())
    }

    /// `{a, b: c, ...rest} = init`: each property binds the matching
    /// property of the initializer and `rest` binds `$Rest<Init, {a, b}>`.
    fn check_destructure(&mut self, pattern: &ObjectPattern) -> CheckResult<()> {
        let interner = self.ctx.interner;
        let annotated = pattern.annotation.as_ref().map(|a| self.lower(a)).transpose()?;
        let init = self.check_expr(&pattern.init, annotated)?;
        let source = match annotated {
            Some(declared) => {
                self.check_assignable(init, declared, pattern.init.span);
                declared
            }
            None => init,
        };

        let mut picked: Vec<PropertyInfo> = Vec::with_capacity(pattern.properties.len());
        for prop in &pattern.properties {
            let key = interner.intern_string(&prop.key);
            let view = self.view();
            let access = TypeEvaluator::new(interner, &view)
                .with_max_depth(self.ctx.options.max_evaluate_depth)
                .property_of(source, key);
            let ty = match access {
                PropertyAccess::Found { type_id, info } => {
                    if info.is_some_and(|info| info.optional) {
                        interner.union2(type_id, TypeId::VOID)
                    } else {
                        type_id
                    }
                }
                PropertyAccess::Missing => {
                    self.error(prop.binding.span, CheckError::MissingProperty { key, on_type: source });
                    TypeId::ERROR
                }
            };
            if !picked.iter().any(|p| p.name == key) {
                picked.push(PropertyInfo::new(key, ty));
            }
            self.bind_pattern_name(&prop.binding, pattern.kind, ty);
        }

        if let Some(rest) = &pattern.rest {
            let rest_ty = self.evaluate(interner.diff(source, interner.object(picked)));
            trace!(source = source.0, rest = rest_ty.0, "object rest");
            self.bind_pattern_name(rest, pattern.kind, rest_ty);
        }
        Ok(())
    }

    fn bind_pattern_name(&mut self, name: &Ident, kind: VarKind, ty: TypeId) {
        let id = match self.scopes.lookup(&name.name) {
            Some(id) => id,
            None => self.scopes.declare(&name.name, BindingFlags::from_var_kind(kind), TypeId::ANY, name.span),
        };
        let declared = match kind {
            VarKind::Const => ty,
            _ => self.widen(ty),
        };
        self.scopes.binding_mut(id).declared = declared;
        self.refinements.invalidate(id);
        self.record_type(name.span, declared);
    }

    fn check_class_body(&mut self, class: &ClassDecl) -> CheckResult<()> {
        self.scopes.push(ScopeKind::Block);
        let result = self.check_class_members(class);
        self.scopes.pop();
        result
    }

    fn check_class_members(&mut self, class: &ClassDecl) -> CheckResult<()> {
        if let Some(named) = self.scopes.lookup_type(&class.name.name) {
            self.declare_type_params(&named.params);
        }
        for member in &class.members {
            match member {
                ClassMember::Property {
                    annotation,
                    value: Some(value),
                    ..
                } => {
                    let expected = annotation.as_ref().map(|a| self.lower(a)).transpose()?;
                    let ty = self.check_expr(value, expected)?;
                    if let Some(expected) = expected {
                        self.check_assignable(ty, expected, value.span);
                    }
                }
                ClassMember::Property { .. } => {}
                ClassMember::Method { function, .. } => {
                    self.check_function(function, None)?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn check_return(&mut self, argument: Option<&Expr>, stmt: &Stmt) -> CheckResult<()> {
        let expected = self.functions.last().and_then(|frame| frame.expected_return);
        let is_async = self.functions.last().is_some_and(|frame| frame.is_async);
        let ty = match argument {
            Some(argument) => self.check_expr(argument, expected)?,
            None => TypeId::VOID,
        };
        let ty = if is_async { self.await_type(ty) } else { ty };
        if let Some(expected) = expected {
            let span = argument.map_or(stmt.span, |argument| argument.span);
            self.check_assignable(ty, expected, span);
        }
        if let Some(frame) = self.functions.last_mut() {
            frame.returns.push(ty);
        }
        Ok(())
    }

    fn check_block(&mut self, body: &[Stmt]) -> CheckResult<Completion> {
        self.scopes.push(ScopeKind::Block);
        self.refinements.enter();
        let result = self
            .hoist_declarations(body)
            .and_then(|()| self.check_statements(body));
        self.refinements.exit();
        self.scopes.pop();
        result
    }

    fn check_if(&mut self, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) -> CheckResult<Completion> {
        self.check_expr(test, None)?;
        let before = self.refinements.snapshot();
        let mut states = Vec::with_capacity(2);

        self.refinements.enter();
        if self.apply_condition(test, true) {
            self.unreachable_branch(consequent);
        }
        let then_completion = self.check_statement(consequent)?;
        if then_completion.falls_through() {
            states.push(self.refinements.branch_state());
        }
        self.refinements.restore(before.clone());

        self.refinements.enter();
        let else_impossible = self.apply_condition(test, false);
        let else_completion = match alternate {
            Some(alternate) => {
                if else_impossible {
                    self.unreachable_branch(alternate);
                }
                self.check_statement(alternate)?
            }
            None => Completion::Normal,
        };
        if else_completion.falls_through() {
            states.push(self.refinements.branch_state());
        }
        self.refinements.restore(before);

        if states.is_empty() {
            return Ok(Completion::Abrupt);
        }
        let scopes = &self.scopes;
        let interner = self.ctx.interner;
        self.refinements.join(
            &states,
            |id| scopes.binding(id).declared,
            |types| interner.union(types),
        );
        Ok(Completion::Normal)
    }

    fn unreachable_branch(&mut self, branch: &Stmt) {
        if self.ctx.options.report_unreachable {
            trace!(start = branch.span.start, "branch refined to empty");
            self.error(branch.span, CheckError::UnreachableCode);
        }
    }

    /// Drop refinements of every binding `stmt` assigns.
    fn invalidate_assigned(&mut self, stmt: &Stmt) {
        for name in assigned_names_in(stmt) {
            if let Some(id) = self.scopes.lookup(&name) {
                self.refinements.invalidate(id);
            }
        }
    }

    fn check_for_of(&mut self, for_of: &ForOf) -> CheckResult<Completion> {
        let iterable = self.check_expr(&for_of.iterable, None)?;
        let element = self.with_checker(|checker| checker.evaluator().element_type_of(iterable));
        let element = self.recover(for_of.iterable.span, element, TypeId::ANY)?;
        self.invalidate_assigned(&for_of.body);

        self.scopes.push(ScopeKind::Block);
        self.refinements.enter();
        let result = self.check_for_of_body(for_of, element);
        self.refinements.exit();
        self.scopes.pop();
        result?;

        self.invalidate_assigned(&for_of.body);
        Ok(Completion::Normal)
    }

    fn check_for_of_body(&mut self, for_of: &ForOf, element: TypeId) -> CheckResult<()> {
        let mut flags = BindingFlags::from_var_kind(for_of.kind);
        let declared = match &for_of.annotation {
            Some(annotation) => {
                flags |= BindingFlags::ANNOTATED;
                let declared = self.lower(annotation)?;
                self.check_assignable(element, declared, for_of.binding.span);
                declared
            }
            None => element,
        };
        let binding = &for_of.binding;
        if flags.contains(BindingFlags::VAR) {
            self.scopes.declare_hoisted(&binding.name, flags, declared, binding.span);
        } else {
            self.scopes.declare(&binding.name, flags, declared, binding.span);
        }
        self.record_type(binding.span, declared);
        self.check_statement(&for_of.body)?;
        Ok(())
    }

    fn check_while(&mut self, test: &Expr, body: &Stmt) -> CheckResult<Completion> {
        self.invalidate_assigned(body);
        self.check_expr(test, None)?;

        let before = self.refinements.snapshot();
        self.refinements.enter();
        if self.apply_condition(test, true) {
            self.unreachable_branch(body);
        }
        let result = self.check_statement(body);
        self.refinements.restore(before);
        result?;

        self.invalidate_assigned(body);
        if contains_break(body) {
            return Ok(Completion::Normal);
        }
        if matches!(test.kind, ExprKind::Bool { value: true }) {
            return Ok(Completion::Abrupt);
        }
        self.apply_condition(test, false);
        Ok(Completion::Normal)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Check a function body and return the function's type. An
    /// unannotated return type is inferred from the `return`s; parameters
    /// without annotations take their type from `contextual` or are `any`.
    pub(crate) fn check_function(&mut self, func: &Function, contextual: Option<TypeId>) -> CheckResult<TypeId> {
        if self.signature_only {
            return self.function_signature(func);
        }
        let contextual = contextual.and_then(|ty| self.function_shape_of(ty));
        self.scopes.push(ScopeKind::Function);
        let result = self.check_function_in_scope(func, contextual.as_deref());
        self.scopes.pop();
        result
    }

    pub(crate) fn function_shape_of(&self, ty: TypeId) -> Option<std::sync::Arc<FunctionShape>> {
        let evaluated = self.evaluate(ty);
        match self.ctx.interner.lookup(evaluated) {
            Some(TypeData::Function(fn_id)) => Some(self.ctx.interner.function_shape(fn_id)),
            _ => None,
        }
    }

    fn check_function_in_scope(&mut self, func: &Function, contextual: Option<&FunctionShape>) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let type_params = self.lower_type_params(&func.type_params)?;
        self.declare_type_params(&type_params);

        let mut params = Vec::with_capacity(func.params.len());
        for (i, param) in func.params.iter().enumerate() {
            let mut flags = BindingFlags::PARAM;
            let ty = match &param.annotation {
                Some(annotation) => {
                    flags |= BindingFlags::ANNOTATED;
                    self.lower(annotation)?
                }
                None => contextual
                    .and_then(|shape| shape.params.get(i))
                    .map_or(TypeId::ANY, |p| p.type_id),
            };
            let local = if param.optional {
                interner.union2(ty, TypeId::VOID)
            } else {
                ty
            };
            self.scopes.declare(&param.name.name, flags, local, param.name.span);
            self.record_type(param.name.span, local);
            params.push(ParamInfo {
                name: Some(interner.intern_string(&param.name.name)),
                type_id: ty,
                optional: param.optional,
                rest: false,
            });
        }

        let declared_ret = func.ret.as_ref().map(|ret| self.lower(ret)).transpose()?;
        let mut frame = FunctionFrame {
            is_async: func.is_async,
            is_generator: func.is_generator,
            ..FunctionFrame::default()
        };
        if let Some(ret) = declared_ret {
            if func.is_generator {
                if let Some(it) = self.iterator_parts(ret) {
                    frame.expected_return = Some(it.return_type);
                    frame.expected_yield = Some(it.yield_type);
                    frame.next_type = it.next_type;
                }
            } else if func.is_async {
                frame.expected_return = Some(self.promise_inner(ret).unwrap_or(ret));
            } else {
                frame.expected_return = Some(ret);
            }
        }

        let (frame, completion) = self.check_body(&func.body, frame)?;
        let return_type = match declared_ret {
            Some(ret) => ret,
            None => self.inferred_return(&frame, completion),
        };
        Ok(interner.function(FunctionShape {
            type_params,
            params,
            return_type,
            predicate: None,
        }))
    }

    /// Run a function body under `frame`. The body sees the narrowings of
    /// enclosing bindings that nothing reassigns.
    fn check_body(&mut self, body: &[Stmt], frame: FunctionFrame) -> CheckResult<(FunctionFrame, Completion)> {
        let inherited = {
            let scopes = &self.scopes;
            let captured = &self.captured;
            self.refinements.inherit(|id: BindingId| {
                let binding = scopes.binding(id);
                binding.flags.contains(BindingFlags::CONST) || !captured.is_assigned(&binding.name)
            })
        };
        let outer = std::mem::replace(&mut self.refinements, inherited);
        let outer_depth = self.expr_depth;
        self.functions.push(frame);
        let result = self
            .hoist_declarations(body)
            .and_then(|()| self.check_statements(body));
        let frame = self.functions.pop().unwrap_or_default();
        self.refinements = outer;
        self.expr_depth = outer_depth;
        Ok((frame, result?))
    }

    fn inferred_return(&self, frame: &FunctionFrame, completion: Completion) -> TypeId {
        let interner = self.ctx.interner;
        let mut returns: Vec<TypeId> = frame.returns.iter().map(|&ty| self.widen(ty)).collect();
        if completion.falls_through() {
            returns.push(TypeId::VOID);
        }
        let returned = interner.union(returns);
        if frame.is_generator {
            let yields = frame.yields.iter().map(|&ty| self.widen(ty)).collect();
            interner.iterator(interner.union(yields), returned, TypeId::ANY)
        } else if frame.is_async {
            interner.promise(returned)
        } else {
            returned
        }
    }

    fn check_component(&mut self, component: &ComponentDecl) -> CheckResult<()> {
        if self.signature_only {
            return Ok(());
        }
        let renders = self
            .scopes
            .lookup(&component.name.name)
            .map(|id| self.scopes.binding(id).declared)
            .and_then(|ty| match self.ctx.interner.lookup(ty) {
                Some(TypeData::Component(c)) => Some(c.renders),
                Some(TypeData::Function(fn_id)) => Some(self.ctx.interner.function_shape(fn_id).return_type),
                _ => None,
            })
            .unwrap_or(TypeId::REACT_NODE);

        self.scopes.push(ScopeKind::Function);
        let result = self.check_component_in_scope(component, renders);
        self.scopes.pop();
        result
    }

    fn check_component_in_scope(&mut self, component: &ComponentDecl, renders: TypeId) -> CheckResult<()> {
        let type_params = self.lower_type_params(&component.type_params)?;
        self.declare_type_params(&type_params);
        for param in &component.params {
            let ty = self.lower(&param.annotation)?;
            let local = if param.optional {
                self.ctx.interner.union2(ty, TypeId::VOID)
            } else {
                ty
            };
            let flags = BindingFlags::PARAM | BindingFlags::ANNOTATED;
            self.scopes.declare(&param.name.name, flags, local, param.name.span);
            self.record_type(param.name.span, local);
        }
        let frame = FunctionFrame {
            expected_return: Some(renders),
            ..FunctionFrame::default()
        };
        self.check_body(&component.body, frame)?;
        Ok(())
    }

    // =========================================================================
    // Async and generator helpers
    // =========================================================================

    /// `T` for `Promise<T>`.
    pub(crate) fn promise_inner(&self, ty: TypeId) -> Option<TypeId> {
        let interner = self.ctx.interner;
        match interner.lookup(self.evaluate(ty))? {
            TypeData::Builtin(BuiltinKind::Promise, list) => interner.type_list(list).first().copied(),
            _ => None,
        }
    }

    /// What `await` of a `ty` value produces.
    pub(crate) fn await_type(&self, ty: TypeId) -> TypeId {
        self.promise_inner(ty).unwrap_or(ty)
    }

    pub(crate) fn iterator_parts(&self, ty: TypeId) -> Option<IteratorType> {
        match self.ctx.interner.lookup(self.evaluate(ty))? {
            TypeData::Iterator(it) => Some(it),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/statements_tests.rs"]
mod tests;
