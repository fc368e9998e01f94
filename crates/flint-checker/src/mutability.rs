//! Binding mutability analysis.
//!
//! Every module-level binding is classified by how it was introduced, and
//! an "exported" bit is computed by reachability over the module's export
//! graph. A binding is exported when it is
//!
//! - declared by an `export` statement or named in an export list,
//! - the default export or `module.exports`,
//! - a value inside an object literal that is itself exported, or
//! - named by `typeof` in an exported type alias.
//!
//! Writes are then resolved lexically. Constants, imports and declared
//! functions are never reassignable. In whole-program mode an exported
//! binding is part of the module signature, so reassigning it is an error
//! unless it is a `let`/`var` with an annotation pinning its type.
//!
//! Function declarations nested in module-level blocks are module-level
//! entries of their own: a shadowing `function f` inside an `if` is
//! subject to the same rules as the outer `f`.

use crate::declarations::declared_names;
use crate::scope::{BindingFlags, BindingKind};
use crate::walk::{Visitor, walk_body, walk_expr, walk_stmt};
use fixedbitset::FixedBitSet;
use flint_ast::{
    ClassMember, Expr, ExprKind, Function, ImportKind, ObjectMember, ObjectProp, Stmt, StmtKind, TypeNode,
    TypeNodeKind, VarKind,
};
use flint_common::Span;
use flint_solver::{CheckError, ReassignmentReason, TypeInterner};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// One module-level binding.
#[derive(Clone, Debug)]
pub struct LocalEntry {
    pub name: String,
    pub kind: BindingKind,
    pub flags: BindingFlags,
    pub span: Span,
    pub exported: bool,
}

impl LocalEntry {
    /// Why writing this binding is an error, if it is.
    pub fn reassignment_error(&self, whole_program: bool) -> Option<ReassignmentReason> {
        let flags = self.flags;
        if flags.contains(BindingFlags::NAMESPACE_IMPORT) {
            return Some(ReassignmentReason::NamespaceImport);
        }
        if flags.contains(BindingFlags::IMPORT) {
            return Some(ReassignmentReason::Import);
        }
        if flags.contains(BindingFlags::CONST) {
            return Some(ReassignmentReason::Const);
        }
        if flags.contains(BindingFlags::FUNCTION | BindingFlags::DECLARED) {
            return Some(ReassignmentReason::DeclaredFunction);
        }
        let pinned = self.kind == BindingKind::BlockScopedMutable && flags.contains(BindingFlags::ANNOTATED);
        if whole_program && self.exported && !pinned {
            return Some(ReassignmentReason::Exported);
        }
        None
    }
}

/// Module-level bindings with their export bits.
#[derive(Debug, Default)]
pub struct ModuleBindings {
    pub entries: Vec<LocalEntry>,
    by_name: FxHashMap<String, Vec<usize>>,
}

impl ModuleBindings {
    pub fn collect(body: &[Stmt]) -> Self {
        let mut bindings = Self::default();
        for stmt in body {
            bindings.collect_stmt(stmt, true);
        }
        let exported = ExportGraph::build(body).reachable();
        for entry in &mut bindings.entries {
            entry.exported = exported.contains(&entry.name);
        }
        bindings
    }

    pub fn lookup(&self, name: &str) -> impl Iterator<Item = &LocalEntry> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    fn push(&mut self, name: &str, flags: BindingFlags, span: Span) {
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push(self.entries.len());
        self.entries.push(LocalEntry {
            name: name.to_string(),
            kind: BindingKind::classify(flags),
            flags,
            span,
            exported: false,
        });
    }

    /// `top` is false inside module-level blocks, where only function
    /// declarations belong to the module.
    fn collect_stmt(&mut self, stmt: &Stmt, top: bool) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) if top || decl.kind == VarKind::Var => {
                let mut flags = BindingFlags::from_var_kind(decl.kind);
                if decl.annotation.is_some() {
                    flags |= BindingFlags::ANNOTATED;
                }
                self.push(&decl.name.name, flags, decl.name.span);
            }
            StmtKind::Destructure(pattern) if top || pattern.kind == VarKind::Var => {
                let flags = BindingFlags::from_var_kind(pattern.kind);
                for binding in pattern.bindings() {
                    self.push(&binding.name, flags, binding.span);
                }
            }
            StmtKind::FunctionDecl(func) => {
                if let Some(name) = &func.name {
                    self.push(&name.name, BindingFlags::FUNCTION, name.span);
                }
            }
            StmtKind::ClassDecl(class) if top => self.push(&class.name.name, BindingFlags::CLASS, class.name.span),
            StmtKind::ComponentDecl(component) if top => {
                self.push(&component.name.name, BindingFlags::COMPONENT, component.name.span);
            }
            StmtKind::DeclareFunction { name, .. } if top => {
                self.push(&name.name, BindingFlags::FUNCTION | BindingFlags::DECLARED, name.span);
            }
            StmtKind::DeclareVar { kind, name, .. } if top => {
                let flags = BindingFlags::from_var_kind(*kind) | BindingFlags::DECLARED | BindingFlags::ANNOTATED;
                self.push(&name.name, flags, name.span);
            }
            StmtKind::Import(import) if top => match &import.kind {
                ImportKind::Named { specifiers } => {
                    for specifier in specifiers {
                        self.push(&specifier.local.name, BindingFlags::IMPORT, specifier.local.span);
                    }
                }
                ImportKind::Default { local } => self.push(&local.name, BindingFlags::IMPORT, local.span),
                ImportKind::Namespace { local } => {
                    self.push(&local.name, BindingFlags::NAMESPACE_IMPORT, local.span);
                }
            },
            StmtKind::Export { declaration } => self.collect_stmt(declaration, top),
            StmtKind::Block { body } => {
                for stmt in body {
                    self.collect_stmt(stmt, false);
                }
            }
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                self.collect_stmt(consequent, false);
                if let Some(alternate) = alternate {
                    self.collect_stmt(alternate, false);
                }
            }
            StmtKind::While { body, .. } => self.collect_stmt(body, false),
            StmtKind::ForOf(for_of) => self.collect_stmt(&for_of.body, false),
            _ => {}
        }
    }
}

// =============================================================================
// Export graph
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Node {
    Value(String),
    Type(String),
}

#[derive(Default)]
struct ExportGraph {
    nodes: IndexMap<Node, Vec<usize>>,
    seeds: Vec<usize>,
}

impl ExportGraph {
    fn build(body: &[Stmt]) -> Self {
        let mut graph = Self::default();
        for stmt in body {
            graph.add_stmt(stmt);
        }
        graph
    }

    fn node(&mut self, node: Node) -> usize {
        let entry = self.nodes.entry(node);
        let index = entry.index();
        entry.or_default();
        index
    }

    fn edge(&mut self, from: usize, to: Node) {
        let to = self.node(to);
        if let Some((_, edges)) = self.nodes.get_index_mut(from) {
            edges.push(to);
        }
    }

    fn seed(&mut self, node: Node) {
        let index = self.node(node);
        self.seeds.push(index);
    }

    fn add_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => {
                let from = self.node(Node::Value(decl.name.name.clone()));
                if let Some(init) = &decl.init {
                    for name in object_literal_values(init) {
                        self.edge(from, Node::Value(name));
                    }
                }
            }
            StmtKind::Destructure(pattern) => {
                for binding in pattern.bindings() {
                    let from = self.node(Node::Value(binding.name.clone()));
                    if let ExprKind::Ident { name } = &pattern.init.kind {
                        self.edge(from, Node::Value(name.clone()));
                    }
                }
            }
            StmtKind::TypeAlias(alias) => {
                let from = self.node(Node::Type(alias.name.name.clone()));
                let mut refs = Vec::new();
                type_references(&alias.body, &mut refs);
                for node in refs {
                    self.edge(from, node);
                }
            }
            StmtKind::Export { declaration } => {
                self.add_stmt(declaration);
                for name in declared_names(declaration) {
                    let node = match declaration.kind {
                        StmtKind::TypeAlias(_) | StmtKind::OpaqueType(_) => Node::Type(name.to_string()),
                        _ => Node::Value(name.to_string()),
                    };
                    self.seed(node);
                }
            }
            StmtKind::ExportNamed { specifiers } => {
                for specifier in specifiers {
                    self.seed(Node::Value(specifier.local.name.clone()));
                    self.seed(Node::Type(specifier.local.name.clone()));
                }
            }
            StmtKind::ExportDefault { expr } | StmtKind::ModuleExports { expr } => {
                if let ExprKind::Ident { name } = &expr.kind {
                    self.seed(Node::Value(name.clone()));
                }
                for name in object_literal_values(expr) {
                    self.seed(Node::Value(name));
                }
            }
            _ => {}
        }
    }

    /// Names of all values reachable from an export.
    fn reachable(&self) -> rustc_hash::FxHashSet<String> {
        let mut visited = FixedBitSet::with_capacity(self.nodes.len());
        let mut queue: Vec<usize> = self.seeds.clone();
        while let Some(index) = queue.pop() {
            if visited.put(index) {
                continue;
            }
            if let Some((_, edges)) = self.nodes.get_index(index) {
                queue.extend(edges.iter().copied().filter(|&next| !visited.contains(next)));
            }
        }
        visited
            .ones()
            .filter_map(|index| match self.nodes.get_index(index) {
                Some((Node::Value(name), _)) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Identifiers used as values inside an object literal, nested literals
/// included.
fn object_literal_values(expr: &Expr) -> Vec<String> {
    fn collect(expr: &Expr, out: &mut Vec<String>) {
        let ExprKind::Object { properties } = &expr.kind else {
            return;
        };
        for prop in properties {
            match prop {
                ObjectProp::Init { value, .. } | ObjectProp::Spread { argument: value } => match &value.kind {
                    ExprKind::Ident { name } => out.push(name.clone()),
                    ExprKind::Object { .. } => collect(value, out),
                    _ => {}
                },
                ObjectProp::Shorthand { name } => out.push(name.name.clone()),
            }
        }
    }

    let mut out = Vec::new();
    collect(expr, &mut out);
    out
}

/// `typeof` targets and named type references in an annotation.
fn type_references(node: &TypeNode, out: &mut Vec<Node>) {
    match &node.kind {
        TypeNodeKind::Typeof { name } => {
            let head = name.split('.').next().unwrap_or(name);
            out.push(Node::Value(head.to_string()));
        }
        TypeNodeKind::Reference { name, args } => {
            out.push(Node::Type(name.clone()));
            for arg in args {
                type_references(arg, out);
            }
        }
        TypeNodeKind::Object { members, .. } => {
            for member in members {
                match member {
                    ObjectMember::Property { value, .. } => type_references(value, out),
                    ObjectMember::Indexer { key, value, .. } => {
                        type_references(key, out);
                        type_references(value, out);
                    }
                    ObjectMember::Spread { argument } => type_references(argument, out),
                }
            }
        }
        TypeNodeKind::Union { members } | TypeNodeKind::Intersection { members } => {
            for member in members {
                type_references(member, out);
            }
        }
        TypeNodeKind::Tuple { elements } => {
            for element in elements {
                type_references(element, out);
            }
        }
        TypeNodeKind::Nullable { inner } | TypeNodeKind::Array { element: inner } | TypeNodeKind::KeyOf { inner } => {
            type_references(inner, out);
        }
        TypeNodeKind::Function(func) => {
            for param in func.params.iter().chain(func.rest.as_deref()) {
                type_references(&param.annotation, out);
            }
            type_references(&func.ret, out);
        }
        TypeNodeKind::IndexedAccess { object, index } => {
            type_references(object, out);
            type_references(index, out);
        }
        TypeNodeKind::Mapped(mapped) => {
            type_references(&mapped.source, out);
            type_references(&mapped.value, out);
        }
        TypeNodeKind::Conditional {
            check,
            extends,
            true_type,
            false_type,
        } => {
            for part in [check, extends, true_type, false_type] {
                type_references(part, out);
            }
        }
        TypeNodeKind::Keyword { .. }
        | TypeNodeKind::StringLiteral { .. }
        | TypeNodeKind::NumberLiteral { .. }
        | TypeNodeKind::BooleanLiteral { .. }
        | TypeNodeKind::Infer { .. }
        | TypeNodeKind::Placeholder => {}
    }
}

// =============================================================================
// Write resolution
// =============================================================================

/// Local names visible in one lexical scope; the value is constness.
type LocalScope = FxHashMap<String, bool>;

/// `in_function` is false for module-level blocks, whose function
/// declarations and `var`s belong to the module.
fn declare_local(scope: &mut LocalScope, stmt: &Stmt, in_function: bool) {
    match &stmt.kind {
        StmtKind::VarDecl(decl) if in_function || decl.kind != VarKind::Var => {
            scope.insert(decl.name.name.clone(), decl.kind == VarKind::Const);
        }
        StmtKind::Destructure(pattern) if in_function || pattern.kind != VarKind::Var => {
            for binding in pattern.bindings() {
                scope.insert(binding.name.clone(), pattern.kind == VarKind::Const);
            }
        }
        StmtKind::FunctionDecl(func) if in_function => {
            if let Some(name) = &func.name {
                scope.insert(name.name.clone(), false);
            }
        }
        StmtKind::ClassDecl(class) => {
            scope.insert(class.name.name.clone(), false);
        }
        StmtKind::ComponentDecl(component) => {
            scope.insert(component.name.name.clone(), false);
        }
        StmtKind::DeclareVar { kind, name, .. } => {
            scope.insert(name.name.clone(), *kind == VarKind::Const);
        }
        _ => {}
    }
}

/// `var` declarations anywhere in a function body, nested blocks included.
fn hoisted_vars(body: &[Stmt], scope: &mut LocalScope) {
    struct Vars<'s> {
        scope: &'s mut LocalScope,
    }

    impl Visitor for Vars<'_> {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            match &stmt.kind {
                StmtKind::VarDecl(decl) if decl.kind == VarKind::Var => {
                    self.scope.insert(decl.name.name.clone(), false);
                }
                StmtKind::Destructure(pattern) if pattern.kind == VarKind::Var => {
                    for binding in pattern.bindings() {
                        self.scope.insert(binding.name.clone(), false);
                    }
                }
                _ => {}
            }
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, _expr: &Expr) {}

        fn visit_function_body(&mut self, _body: &[Stmt]) {}
    }

    walk_body(&mut Vars { scope }, body);
}

struct WriteChecker<'m> {
    module: &'m ModuleBindings,
    interner: &'m TypeInterner,
    whole_program: bool,
    scopes: Vec<LocalScope>,
    function_depth: u32,
    errors: Vec<(Span, CheckError)>,
}

impl WriteChecker<'_> {
    fn with_scope(&mut self, scope: LocalScope, f: impl FnOnce(&mut Self)) {
        self.scopes.push(scope);
        f(self);
        self.scopes.pop();
    }

    fn function<'p>(&mut self, params: impl Iterator<Item = &'p str>, body: &[Stmt]) {
        let mut scope: LocalScope = params.map(|name| (name.to_string(), false)).collect();
        for stmt in body {
            declare_local(&mut scope, stmt, true);
        }
        hoisted_vars(body, &mut scope);
        self.function_depth += 1;
        self.with_scope(scope, |this| walk_body(this, body));
        self.function_depth -= 1;
    }

    fn enter_function(&mut self, func: &Function) {
        let params = func.params.iter().map(|p| p.name.name.as_str());
        self.function(params, &func.body);
    }

    fn report(&mut self, span: Span, name: &str, reason: ReassignmentReason) {
        debug!(name, ?reason, "invalid reassignment");
        let name = self.interner.intern_string(name);
        self.errors.push((span, CheckError::InvalidReassignment { name, reason }));
    }

    /// A local shadowing `name`, innermost first: `Some(is_const)`.
    fn local(&self, name: &str) -> Option<bool> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    fn check_write(&mut self, name: &str, span: Span) {
        match self.local(name) {
            Some(true) => self.report(span, name, ReassignmentReason::Const),
            Some(false) => {}
            None => {
                let reason = self
                    .module
                    .lookup(name)
                    .find_map(|entry| entry.reassignment_error(self.whole_program));
                if let Some(reason) = reason {
                    self.report(span, name, reason);
                }
            }
        }
    }

    fn check_member_write(&mut self, name: &str, span: Span) {
        if self.local(name).is_some() {
            return;
        }
        let namespace = self
            .module
            .lookup(name)
            .any(|entry| entry.flags.contains(BindingFlags::NAMESPACE_IMPORT));
        if namespace {
            self.report(span, name, ReassignmentReason::NamespaceImport);
        }
    }
}

impl Visitor for WriteChecker<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block { body } => {
                let in_function = self.function_depth > 0;
                let mut scope = LocalScope::default();
                for stmt in body {
                    declare_local(&mut scope, stmt, in_function);
                }
                self.with_scope(scope, |this| walk_body(this, body));
            }
            StmtKind::ForOf(for_of) => {
                self.visit_expr(&for_of.iterable);
                let mut scope = LocalScope::default();
                scope.insert(for_of.binding.name.clone(), for_of.kind == VarKind::Const);
                self.with_scope(scope, |this| this.visit_stmt(&for_of.body));
            }
            StmtKind::FunctionDecl(func) => self.enter_function(func),
            StmtKind::ClassDecl(class) => {
                for member in &class.members {
                    match member {
                        ClassMember::Property { value: Some(value), .. } => self.visit_expr(value),
                        ClassMember::Property { value: None, .. } => {}
                        ClassMember::Method { function, .. } => self.enter_function(function),
                    }
                }
            }
            StmtKind::ComponentDecl(component) => {
                let params = component.params.iter().map(|p| p.name.name.as_str());
                self.function(params, &component.body);
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Function(func) => self.enter_function(func),
            ExprKind::Assign { target, value } => {
                match &target.kind {
                    ExprKind::Ident { name } => self.check_write(name, expr.span),
                    ExprKind::Member { object, .. } => {
                        if let ExprKind::Ident { name } = &object.kind {
                            self.check_member_write(name, expr.span);
                        }
                        self.visit_expr(object);
                    }
                    _ => self.visit_expr(target),
                }
                self.visit_expr(value);
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Invalid writes in `body`, at the span of each assignment.
pub fn analyze_mutability(interner: &TypeInterner, body: &[Stmt], whole_program: bool) -> Vec<(Span, CheckError)> {
    let module = ModuleBindings::collect(body);
    let mut checker = WriteChecker {
        module: &module,
        interner,
        whole_program,
        scopes: Vec::new(),
        function_depth: 0,
        errors: Vec::new(),
    };
    walk_body(&mut checker, body);
    checker.errors
}

#[cfg(test)]
#[path = "../tests/mutability_tests.rs"]
mod tests;
