//! Checker state for one module.
//!
//! `CheckerState` is split across several files, each adding an `impl`
//! block for one concern:
//!
//! - `declarations.rs`: hoisting, type definitions, declared signatures
//! - `statements.rs`: statements, branches and loops
//! - `expr.rs`: expressions and calls
//! - `jsx.rs`: JSX elements against component configs
//! - `error_reporter.rs`: conversion of recorded errors into diagnostics
//!
//! This file holds the state itself, the module driver and the helpers
//! every other part uses to lower annotations, compare types and record
//! errors.

use crate::context::CheckerContext;
use crate::declarations::ExportTable;
use crate::mutability::analyze_mutability;
use crate::refinement::{CapturedWrites, RefinementTracker};
use crate::scope::{BindingId, LoweringScope, ScopeStack};
use crate::session::{CheckedModule, ModuleSignature};
use flint_ast::Stmt;
use flint_common::Span;
use flint_solver::{
    CheckError, CheckResult, ModuleView, PendingBoundCheck, SubtypeChecker, TypeEvaluator,
    TypeGuard, TypeId, TypeLowering, instantiate_params, widen_literal,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-function bookkeeping while its body is checked.
#[derive(Clone, Debug)]
pub(crate) struct FunctionFrame {
    /// Type `return` arguments are checked against (already unwrapped from
    /// `Promise` / `Generator` for async functions and generators).
    pub expected_return: Option<TypeId>,
    pub expected_yield: Option<TypeId>,
    /// What `yield` evaluates to.
    pub next_type: TypeId,
    pub returns: Vec<TypeId>,
    pub yields: Vec<TypeId>,
    pub is_async: bool,
    pub is_generator: bool,
}

impl Default for FunctionFrame {
    fn default() -> Self {
        Self {
            expected_return: None,
            expected_yield: None,
            next_type: TypeId::ANY,
            returns: Vec::new(),
            yields: Vec::new(),
            is_async: false,
            is_generator: false,
        }
    }
}

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
    pub(crate) source: &'a str,
    pub(crate) scopes: ScopeStack,
    pub(crate) refinements: RefinementTracker,
    pub(crate) captured: CapturedWrites,
    pub(crate) functions: Vec<FunctionFrame>,
    pub(crate) errors: Vec<(Span, CheckError)>,
    pub(crate) type_spans: Vec<(Span, TypeId)>,
    pub(crate) exports: ExportTable,
    /// Constructor signatures of classes declared in this module.
    pub(crate) constructors: FxHashMap<flint_solver::DefId, TypeId>,
    /// Skip bodies: only hoisted declarations and annotations are looked at.
    pub(crate) signature_only: bool,
    pub(crate) expr_depth: u32,
}

impl<'a> CheckerState<'a> {
    pub fn new(ctx: CheckerContext<'a>, source: &'a str) -> Self {
        Self {
            ctx,
            source,
            scopes: ScopeStack::new(),
            refinements: RefinementTracker::new(),
            captured: CapturedWrites::default(),
            functions: Vec::new(),
            errors: Vec::new(),
            type_spans: Vec::new(),
            exports: ExportTable::default(),
            constructors: FxHashMap::default(),
            signature_only: false,
            expr_depth: 0,
        }
    }

    // =========================================================================
    // Module drivers
    // =========================================================================

    /// Check a whole module body.
    pub fn check_module(mut self, body: &[Stmt]) -> CheckedModule {
        self.captured = CapturedWrites::collect(body);
        let signature = match self.check_top_level(body) {
            Ok(()) => {
                let whole_program = self.ctx.options.whole_program();
                self.errors
                    .extend(analyze_mutability(self.ctx.interner, body, whole_program));
                self.collect_exports(body)
            }
            Err(fatal) => {
                debug!(module = self.ctx.file, error = %fatal, "module check aborted");
                self.errors.push((Span::DUMMY, fatal));
                ModuleSignature::default()
            }
        };
        let diagnostics = self.build_diagnostics();
        CheckedModule {
            name: self.ctx.file.to_string(),
            errors: self.errors,
            diagnostics,
            type_spans: self.type_spans,
            signature: Arc::new(signature),
        }
    }

    /// The declared export signature of a module: annotations only, no
    /// body is checked. Errors are discarded; the full check reports them.
    pub fn declare_module(mut self, body: &[Stmt]) -> ModuleSignature {
        self.signature_only = true;
        match self.hoist_declarations(body) {
            Ok(()) => self.collect_exports(body),
            Err(fatal) => {
                debug!(module = self.ctx.file, error = %fatal, "declared signature aborted");
                ModuleSignature::default()
            }
        }
    }

    fn check_top_level(&mut self, body: &[Stmt]) -> CheckResult<()> {
        self.hoist_declarations(body)?;
        self.check_statements(body)?;
        Ok(())
    }

    // =========================================================================
    // Errors and spans
    // =========================================================================

    pub(crate) fn error(&mut self, span: Span, error: CheckError) {
        trace!(start = span.start, end = span.end, error = %error, "record error");
        self.errors.push((span, error));
    }

    /// Record a recoverable error, or propagate a fatal one.
    pub(crate) fn recover<T>(&mut self, span: Span, result: CheckResult<T>, fallback: T) -> CheckResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.error(span, err);
                Ok(fallback)
            }
        }
    }

    pub(crate) fn record_type(&mut self, span: Span, ty: TypeId) {
        if !span.is_dummy() {
            self.type_spans.push((span, ty));
        }
    }

    // =========================================================================
    // Solver access
    // =========================================================================

    pub(crate) fn view(&self) -> ModuleView<'a> {
        self.ctx.view()
    }

    /// Run `f` with a subtype checker configured from the options.
    pub(crate) fn with_checker<T>(
        &self,
        f: impl FnOnce(&mut SubtypeChecker<'_, ModuleView<'_>>) -> T,
    ) -> T {
        let view = self.view();
        let options = self.ctx.options;
        let mut checker = SubtypeChecker::new(self.ctx.interner, &view)
            .with_max_depth(options.max_subtype_depth)
            .with_evaluate_depth(options.max_evaluate_depth);
        f(&mut checker)
    }

    pub(crate) fn evaluate(&self, ty: TypeId) -> TypeId {
        let view = self.view();
        TypeEvaluator::new(self.ctx.interner, &view)
            .with_max_depth(self.ctx.options.max_evaluate_depth)
            .evaluate(ty)
    }

    pub(crate) fn is_subtype(&self, source: TypeId, target: TypeId) -> bool {
        self.with_checker(|checker| checker.is_subtype_of(source, target))
    }

    /// Check `source <: target`, recording an incompatibility at `span`.
    pub(crate) fn check_assignable(&mut self, source: TypeId, target: TypeId, span: Span) -> bool {
        match self.with_checker(|checker| checker.check(source, target)) {
            Ok(()) => true,
            Err(reason) => {
                self.error(span, CheckError::incompatible(source, target, reason));
                false
            }
        }
    }

    pub(crate) fn narrow_type(&self, ty: TypeId, guard: &TypeGuard, sense: bool) -> TypeId {
        self.with_checker(|checker| checker.narrow(ty, guard, sense))
    }

    pub(crate) fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.ctx.interner.union(members)
    }

    pub(crate) fn widen(&self, ty: TypeId) -> TypeId {
        let interner = self.ctx.interner;
        match interner.lookup(ty) {
            Some(flint_solver::TypeData::Union(_)) => interner.union(
                interner
                    .union_members(ty)
                    .into_iter()
                    .map(|m| widen_literal(interner, m))
                    .collect(),
            ),
            _ => widen_literal(interner, ty),
        }
    }

    // =========================================================================
    // Annotation lowering
    // =========================================================================

    /// Lower annotations against the current scopes.
    ///
    /// Lowered spans feed type-at-position, recoverable lowering errors are
    /// recorded, and bound checks on applied type arguments run once the
    /// lowering is done.
    pub(crate) fn with_lowering<T>(
        &mut self,
        f: impl FnOnce(&mut TypeLowering<'_, LoweringScope<'_>>) -> CheckResult<T>,
    ) -> CheckResult<T> {
        let (result, spans, errors, bound_checks) = {
            let scope = LoweringScope::new(&self.scopes);
            let mut lowering = TypeLowering::new(self.ctx.interner, &scope);
            let result = f(&mut lowering);
            (
                result,
                std::mem::take(&mut lowering.spans),
                std::mem::take(&mut lowering.errors),
                std::mem::take(&mut lowering.bound_checks),
            )
        };
        self.type_spans.extend(spans);
        for (span, error) in errors {
            self.error(span, error);
        }
        for check in bound_checks {
            self.check_bounds(check);
        }
        result
    }

    fn check_bounds(&mut self, check: PendingBoundCheck) {
        let result = self.with_checker(|checker| {
            instantiate_params(checker, &check.name, &check.params, &check.args, None)
        });
        match result {
            Ok(instantiation) => {
                for violation in instantiation.violations {
                    self.error(check.span, violation);
                }
            }
            Err(err) => self.error(check.span, err),
        }
    }

    pub(crate) fn lower(&mut self, node: &flint_ast::TypeNode) -> CheckResult<TypeId> {
        self.with_lowering(|lowering| lowering.lower(node))
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Current type of a binding: its refinement if any, else its declared
    /// type.
    pub(crate) fn binding_type(&self, id: BindingId) -> TypeId {
        self.refinements
            .current(id)
            .unwrap_or_else(|| self.scopes.binding(id).declared)
    }

    /// Forget refinements a closure may have invalidated while the function
    /// was suspended.
    pub(crate) fn havoc_captured(&mut self) {
        let scopes = &self.scopes;
        let captured = &self.captured;
        let count = self.refinements.havoc(|id| {
            let binding = scopes.binding(id);
            captured.written_by_closure(&binding.name, binding.function_depth)
        });
        if count > 0 {
            debug!(count, "refinements invalidated at suspension point");
        }
    }
}
