//! Read-only traversal of the statement IR.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending.

use flint_ast::{ClassMember, Expr, ExprKind, Function, JsxAttribute, ObjectProp, Stmt, StmtKind};

pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, func: &Function) {
        walk_function(self, func);
    }

    /// Function bodies, including methods and component bodies.
    fn visit_function_body(&mut self, body: &[Stmt]) {
        walk_body(self, body);
    }
}

pub fn walk_body<V: Visitor + ?Sized>(visitor: &mut V, body: &[Stmt]) {
    for stmt in body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, func: &Function) {
    visitor.visit_function_body(&func.body);
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::VarDecl(decl) => {
            if let Some(init) = &decl.init {
                visitor.visit_expr(init);
            }
        }
        StmtKind::Destructure(pattern) => visitor.visit_expr(&pattern.init),
        StmtKind::FunctionDecl(func) => visitor.visit_function(func),
        StmtKind::ClassDecl(class) => {
            for member in &class.members {
                match member {
                    ClassMember::Property { value, .. } => {
                        if let Some(value) = value {
                            visitor.visit_expr(value);
                        }
                    }
                    ClassMember::Method { function, .. } => visitor.visit_function(function),
                }
            }
        }
        StmtKind::ComponentDecl(component) => visitor.visit_function_body(&component.body),
        StmtKind::Expr { expr }
        | StmtKind::Throw { argument: expr }
        | StmtKind::ExportDefault { expr }
        | StmtKind::ModuleExports { expr } => visitor.visit_expr(expr),
        StmtKind::Return { argument } => {
            if let Some(argument) = argument {
                visitor.visit_expr(argument);
            }
        }
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                visitor.visit_stmt(alternate);
            }
        }
        StmtKind::Block { body } => walk_body(visitor, body),
        StmtKind::ForOf(for_of) => {
            visitor.visit_expr(&for_of.iterable);
            visitor.visit_stmt(&for_of.body);
        }
        StmtKind::While { test, body } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(body);
        }
        StmtKind::Export { declaration } => visitor.visit_stmt(declaration),
        StmtKind::DeclareFunction { .. }
        | StmtKind::DeclareVar { .. }
        | StmtKind::TypeAlias(_)
        | StmtKind::OpaqueType(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::ExportNamed { .. }
        | StmtKind::Import(_) => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident { .. }
        | ExprKind::Null
        | ExprKind::Bool { .. }
        | ExprKind::Number { .. }
        | ExprKind::String { .. } => {}
        ExprKind::Object { properties } => {
            for prop in properties {
                match prop {
                    ObjectProp::Init { value, .. } => visitor.visit_expr(value),
                    ObjectProp::Shorthand { .. } => {}
                    ObjectProp::Spread { argument } => visitor.visit_expr(argument),
                }
            }
        }
        ExprKind::Array { elements } => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::Member { object, .. } => visitor.visit_expr(object),
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args, .. } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Function(func) => visitor.visit_function(func),
        ExprKind::Await { argument } | ExprKind::Unary { argument, .. } => {
            visitor.visit_expr(argument);
        }
        ExprKind::Yield { argument, .. } => {
            if let Some(argument) = argument {
                visitor.visit_expr(argument);
            }
        }
        ExprKind::Cast { expr, .. } => visitor.visit_expr(expr),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_expr(consequent);
            visitor.visit_expr(alternate);
        }
        ExprKind::Assign { target, value } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Jsx(element) => {
            for attr in &element.attributes {
                match attr {
                    JsxAttribute::Attr { value, .. } => {
                        if let Some(value) = value {
                            visitor.visit_expr(value);
                        }
                    }
                    JsxAttribute::Spread { argument } => visitor.visit_expr(argument),
                }
            }
            for child in &element.children {
                visitor.visit_expr(child);
            }
        }
    }
}

/// Names assigned anywhere under `body`, not descending into nested
/// functions.
pub fn assigned_names(body: &[Stmt]) -> Vec<String> {
    struct Collector {
        names: Vec<String>,
    }

    impl Visitor for Collector {
        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Assign { target, .. } = &expr.kind
                && let ExprKind::Ident { name } = &target.kind
                && !self.names.contains(name)
            {
                self.names.push(name.clone());
            }
            walk_expr(self, expr);
        }

        fn visit_function_body(&mut self, _body: &[Stmt]) {}
    }

    let mut collector = Collector { names: Vec::new() };
    walk_body(&mut collector, body);
    collector.names
}

/// [`assigned_names`] for a single statement.
pub fn assigned_names_in(stmt: &Stmt) -> Vec<String> {
    assigned_names(std::slice::from_ref(stmt))
}
