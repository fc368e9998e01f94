//! Terse constructors for IR nodes.
//!
//! Used by tests, benches and tools that assemble programs without a parser.
//! Every constructor produces a node with a dummy span; chain `.at(start, end)`
//! where positions matter.

use crate::stmt::*;
use crate::types::*;

/// Type annotation constructors.
pub mod ty {
    use super::*;

    fn kw(keyword: Keyword) -> TypeNode {
        TypeNode::new(TypeNodeKind::Keyword { keyword })
    }

    pub fn number() -> TypeNode {
        kw(Keyword::Number)
    }
    pub fn string() -> TypeNode {
        kw(Keyword::String)
    }
    pub fn boolean() -> TypeNode {
        kw(Keyword::Boolean)
    }
    pub fn bigint() -> TypeNode {
        kw(Keyword::Bigint)
    }
    pub fn symbol() -> TypeNode {
        kw(Keyword::Symbol)
    }
    pub fn void() -> TypeNode {
        kw(Keyword::Void)
    }
    pub fn null() -> TypeNode {
        kw(Keyword::Null)
    }
    pub fn mixed() -> TypeNode {
        kw(Keyword::Mixed)
    }
    pub fn empty() -> TypeNode {
        kw(Keyword::Empty)
    }
    pub fn any() -> TypeNode {
        kw(Keyword::Any)
    }

    pub fn str_lit(value: &str) -> TypeNode {
        TypeNode::new(TypeNodeKind::StringLiteral {
            value: value.to_string(),
        })
    }
    pub fn num_lit(value: f64) -> TypeNode {
        TypeNode::new(TypeNodeKind::NumberLiteral { value })
    }
    pub fn bool_lit(value: bool) -> TypeNode {
        TypeNode::new(TypeNodeKind::BooleanLiteral { value })
    }

    pub fn named(name: &str) -> TypeNode {
        app(name, Vec::new())
    }
    pub fn app(name: &str, args: Vec<TypeNode>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Reference {
            name: name.to_string(),
            args,
        })
    }

    pub fn exact(members: Vec<ObjectMember>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Object {
            exact: true,
            members,
        })
    }
    pub fn inexact(members: Vec<ObjectMember>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Object {
            exact: false,
            members,
        })
    }

    fn property(
        name: &str,
        value: TypeNode,
        optional: bool,
        variance: VarianceAnnotation,
        method: bool,
    ) -> ObjectMember {
        ObjectMember::Property {
            name: name.to_string(),
            value,
            optional,
            variance,
            method,
            span: flint_common::Span::DUMMY,
        }
    }
    pub fn prop(name: &str, value: TypeNode) -> ObjectMember {
        property(name, value, false, VarianceAnnotation::None, false)
    }
    pub fn opt_prop(name: &str, value: TypeNode) -> ObjectMember {
        property(name, value, true, VarianceAnnotation::None, false)
    }
    /// `+name: value`
    pub fn ro_prop(name: &str, value: TypeNode) -> ObjectMember {
        property(name, value, false, VarianceAnnotation::Plus, false)
    }
    /// `-name: value`
    pub fn wo_prop(name: &str, value: TypeNode) -> ObjectMember {
        property(name, value, false, VarianceAnnotation::Minus, false)
    }
    pub fn method(name: &str, value: TypeNode) -> ObjectMember {
        property(name, value, false, VarianceAnnotation::None, true)
    }
    pub fn indexer(key: TypeNode, value: TypeNode) -> ObjectMember {
        ObjectMember::Indexer {
            key,
            value,
            variance: VarianceAnnotation::None,
        }
    }
    pub fn ro_indexer(key: TypeNode, value: TypeNode) -> ObjectMember {
        ObjectMember::Indexer {
            key,
            value,
            variance: VarianceAnnotation::Plus,
        }
    }
    pub fn spread(argument: TypeNode) -> ObjectMember {
        ObjectMember::Spread { argument }
    }

    pub fn union(members: Vec<TypeNode>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Union { members })
    }
    pub fn intersection(members: Vec<TypeNode>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Intersection { members })
    }
    pub fn nullable(inner: TypeNode) -> TypeNode {
        TypeNode::new(TypeNodeKind::Nullable {
            inner: Box::new(inner),
        })
    }
    pub fn array(element: TypeNode) -> TypeNode {
        TypeNode::new(TypeNodeKind::Array {
            element: Box::new(element),
        })
    }
    pub fn tuple(elements: Vec<TypeNode>) -> TypeNode {
        TypeNode::new(TypeNodeKind::Tuple { elements })
    }

    pub fn param(annotation: TypeNode) -> FunctionTypeParam {
        FunctionTypeParam {
            name: None,
            annotation,
            optional: false,
        }
    }
    pub fn func(params: Vec<TypeNode>, ret: TypeNode) -> TypeNode {
        generic_func(Vec::new(), params, ret)
    }
    pub fn generic_func(
        type_params: Vec<TypeParamNode>,
        params: Vec<TypeNode>,
        ret: TypeNode,
    ) -> TypeNode {
        TypeNode::new(TypeNodeKind::Function(FunctionTypeNode {
            type_params,
            params: params.into_iter().map(param).collect(),
            rest: None,
            ret: Box::new(ret),
            guard: None,
        }))
    }
    /// `(x: param) => x is guarded`
    pub fn guard_func(param_type: TypeNode, guarded: TypeNode) -> TypeNode {
        TypeNode::new(TypeNodeKind::Function(FunctionTypeNode {
            type_params: Vec::new(),
            params: vec![FunctionTypeParam {
                name: Some("x".to_string()),
                annotation: param_type,
                optional: false,
            }],
            rest: None,
            ret: Box::new(boolean()),
            guard: Some(TypeGuardNode {
                param: "x".to_string(),
                annotation: Box::new(guarded),
            }),
        }))
    }

    pub fn typeof_(name: &str) -> TypeNode {
        TypeNode::new(TypeNodeKind::Typeof {
            name: name.to_string(),
        })
    }
    pub fn keyof(inner: TypeNode) -> TypeNode {
        TypeNode::new(TypeNodeKind::KeyOf {
            inner: Box::new(inner),
        })
    }
    pub fn index(object: TypeNode, index: TypeNode) -> TypeNode {
        TypeNode::new(TypeNodeKind::IndexedAccess {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn mapped(key: &str, source: TypeNode, value: TypeNode) -> TypeNode {
        mapped_with(key, source, value, None, VarianceAnnotation::None)
    }
    pub fn mapped_with(
        key: &str,
        source: TypeNode,
        value: TypeNode,
        optional: Option<OptionalModifier>,
        variance: VarianceAnnotation,
    ) -> TypeNode {
        TypeNode::new(TypeNodeKind::Mapped(MappedTypeNode {
            key: key.to_string(),
            source: Box::new(source),
            value: Box::new(value),
            optional,
            variance,
        }))
    }

    pub fn conditional(
        check: TypeNode,
        extends: TypeNode,
        true_type: TypeNode,
        false_type: TypeNode,
    ) -> TypeNode {
        TypeNode::new(TypeNodeKind::Conditional {
            check: Box::new(check),
            extends: Box::new(extends),
            true_type: Box::new(true_type),
            false_type: Box::new(false_type),
        })
    }
    pub fn infer(name: &str) -> TypeNode {
        TypeNode::new(TypeNodeKind::Infer {
            name: name.to_string(),
        })
    }
    pub fn placeholder() -> TypeNode {
        TypeNode::new(TypeNodeKind::Placeholder)
    }

    pub fn tparam(name: &str) -> TypeParamNode {
        TypeParamNode {
            name: name.to_string(),
            bound: None,
            default: None,
            variance: VarianceAnnotation::None,
            span: flint_common::Span::DUMMY,
        }
    }
    pub fn bounded(name: &str, bound: TypeNode) -> TypeParamNode {
        TypeParamNode {
            bound: Some(bound),
            ..tparam(name)
        }
    }
    pub fn defaulted(name: &str, bound: Option<TypeNode>, default: TypeNode) -> TypeParamNode {
        TypeParamNode {
            bound,
            default: Some(default),
            ..tparam(name)
        }
    }
}

/// Expression constructors.
pub mod ex {
    use super::*;

    pub fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Ident {
            name: name.to_string(),
        })
    }
    pub fn null() -> Expr {
        Expr::new(ExprKind::Null)
    }
    pub fn num(value: f64) -> Expr {
        Expr::new(ExprKind::Number { value })
    }
    pub fn str(value: &str) -> Expr {
        Expr::new(ExprKind::String {
            value: value.to_string(),
        })
    }
    pub fn bool(value: bool) -> Expr {
        Expr::new(ExprKind::Bool { value })
    }

    pub fn object(properties: Vec<ObjectProp>) -> Expr {
        Expr::new(ExprKind::Object { properties })
    }
    pub fn init(key: &str, value: Expr) -> ObjectProp {
        ObjectProp::Init {
            key: key.to_string(),
            key_span: flint_common::Span::DUMMY,
            value,
        }
    }
    pub fn shorthand(name: &str) -> ObjectProp {
        ObjectProp::Shorthand {
            name: Ident::new(name),
        }
    }
    pub fn spread(argument: Expr) -> ObjectProp {
        ObjectProp::Spread { argument }
    }
    pub fn array(elements: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Array { elements })
    }

    pub fn member(object: Expr, property: &str) -> Expr {
        Expr::new(ExprKind::Member {
            object: Box::new(object),
            property: property.to_string(),
            property_span: flint_common::Span::DUMMY,
        })
    }
    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            type_args: None,
            args,
        })
    }
    pub fn call_with(callee: Expr, type_args: Vec<TypeNode>, args: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            type_args: Some(type_args),
            args,
        })
    }
    pub fn new(callee: Expr, type_args: Option<Vec<TypeNode>>, args: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::New {
            callee: Box::new(callee),
            type_args,
            args,
        })
    }
    pub fn function(function: Function) -> Expr {
        Expr::new(ExprKind::Function(Box::new(function)))
    }
    /// `(params) => { body }`
    pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Expr {
        function(Function {
            params,
            body,
            is_arrow: true,
            ..Function::default()
        })
    }
    pub fn await_(argument: Expr) -> Expr {
        Expr::new(ExprKind::Await {
            argument: Box::new(argument),
        })
    }
    pub fn yield_(argument: Option<Expr>) -> Expr {
        Expr::new(ExprKind::Yield {
            argument: argument.map(Box::new),
            delegate: false,
        })
    }
    pub fn cast(expr: Expr, annotation: TypeNode) -> Expr {
        Expr::new(ExprKind::Cast {
            expr: Box::new(expr),
            annotation,
        })
    }
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
    pub fn strict_eq(left: Expr, right: Expr) -> Expr {
        binary(BinaryOp::StrictEq, left, right)
    }
    pub fn strict_neq(left: Expr, right: Expr) -> Expr {
        binary(BinaryOp::StrictNotEq, left, right)
    }
    pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
        Expr::new(ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
    pub fn unary(op: UnaryOp, argument: Expr) -> Expr {
        Expr::new(ExprKind::Unary {
            op,
            argument: Box::new(argument),
        })
    }
    pub fn not(argument: Expr) -> Expr {
        unary(UnaryOp::Not, argument)
    }
    pub fn assign(target: Expr, value: Expr) -> Expr {
        Expr::new(ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        })
    }
    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Expr {
        Expr::new(ExprKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }
    pub fn jsx(name: &str, attributes: Vec<JsxAttribute>, children: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Jsx(JsxElement {
            name: name.to_string(),
            name_span: flint_common::Span::DUMMY,
            type_args: None,
            attributes,
            children,
        }))
    }
    pub fn attr(name: &str, value: Option<Expr>) -> JsxAttribute {
        JsxAttribute::Attr {
            name: Ident::new(name),
            value,
        }
    }
    pub fn attr_spread(argument: Expr) -> JsxAttribute {
        JsxAttribute::Spread { argument }
    }
}

/// Statement constructors.
pub mod st {
    use super::*;

    pub fn var(kind: VarKind, name: &str, annotation: Option<TypeNode>, init: Option<Expr>) -> Stmt {
        Stmt::new(StmtKind::VarDecl(VarDecl {
            kind,
            name: Ident::new(name),
            annotation,
            init,
        }))
    }
    pub fn let_(name: &str, annotation: Option<TypeNode>, init: Option<Expr>) -> Stmt {
        var(VarKind::Let, name, annotation, init)
    }
    pub fn const_(name: &str, annotation: Option<TypeNode>, init: Expr) -> Stmt {
        var(VarKind::Const, name, annotation, Some(init))
    }
    /// `kind {key, key: local, ...rest} = init`; a property is `(key, local)`.
    pub fn destructure(kind: VarKind, properties: &[(&str, &str)], rest: Option<&str>, init: Expr) -> Stmt {
        Stmt::new(StmtKind::Destructure(ObjectPattern {
            kind,
            properties: properties
                .iter()
                .map(|&(key, local)| PatternProperty {
                    key: key.to_string(),
                    binding: Ident::new(local),
                })
                .collect(),
            rest: rest.map(Ident::new),
            annotation: None,
            init,
        }))
    }

    pub fn param(name: &str, annotation: Option<TypeNode>) -> Param {
        Param {
            name: Ident::new(name),
            annotation,
            optional: false,
        }
    }

    /// A plain named function; adjust flags with struct update syntax.
    pub fn function(
        name: &str,
        params: Vec<Param>,
        ret: Option<TypeNode>,
        body: Vec<Stmt>,
    ) -> Function {
        Function {
            name: Some(Ident::new(name)),
            params,
            ret,
            body,
            ..Function::default()
        }
    }
    pub fn function_decl(function: Function) -> Stmt {
        Stmt::new(StmtKind::FunctionDecl(function))
    }

    pub fn declare_function(name: &str, annotation: TypeNode) -> Stmt {
        Stmt::new(StmtKind::DeclareFunction {
            name: Ident::new(name),
            annotation,
        })
    }
    pub fn declare_var(name: &str, annotation: TypeNode) -> Stmt {
        Stmt::new(StmtKind::DeclareVar {
            kind: VarKind::Var,
            name: Ident::new(name),
            annotation,
        })
    }
    pub fn declare_const(name: &str, annotation: TypeNode) -> Stmt {
        Stmt::new(StmtKind::DeclareVar {
            kind: VarKind::Const,
            name: Ident::new(name),
            annotation,
        })
    }

    pub fn type_alias(name: &str, type_params: Vec<TypeParamNode>, body: TypeNode) -> Stmt {
        Stmt::new(StmtKind::TypeAlias(TypeAlias {
            name: Ident::new(name),
            type_params,
            body,
        }))
    }
    pub fn opaque_type(
        name: &str,
        type_params: Vec<TypeParamNode>,
        bound: Option<TypeNode>,
        body: Option<TypeNode>,
    ) -> Stmt {
        Stmt::new(StmtKind::OpaqueType(OpaqueTypeDecl {
            name: Ident::new(name),
            type_params,
            bound,
            body,
        }))
    }

    pub fn class(name: &str, extends: Option<TypeNode>, members: Vec<ClassMember>) -> Stmt {
        Stmt::new(StmtKind::ClassDecl(ClassDecl {
            name: Ident::new(name),
            type_params: Vec::new(),
            extends,
            members,
        }))
    }
    pub fn static_prop(name: &str, annotation: Option<TypeNode>, value: Option<Expr>) -> ClassMember {
        ClassMember::Property {
            name: Ident::new(name),
            annotation,
            value,
            is_static: true,
            variance: VarianceAnnotation::None,
        }
    }
    pub fn instance_prop(name: &str, annotation: TypeNode) -> ClassMember {
        ClassMember::Property {
            name: Ident::new(name),
            annotation: Some(annotation),
            value: None,
            is_static: false,
            variance: VarianceAnnotation::None,
        }
    }
    pub fn class_method(function: Function) -> ClassMember {
        ClassMember::Method {
            function,
            is_static: false,
        }
    }

    pub fn component(
        name: &str,
        type_params: Vec<TypeParamNode>,
        params: Vec<ComponentParam>,
        renders: Option<RendersAnnotation>,
        body: Vec<Stmt>,
    ) -> Stmt {
        Stmt::new(StmtKind::ComponentDecl(ComponentDecl {
            name: Ident::new(name),
            type_params,
            params,
            renders,
            body,
        }))
    }
    pub fn component_param(name: &str, annotation: TypeNode) -> ComponentParam {
        ComponentParam {
            name: Ident::new(name),
            annotation,
            optional: false,
        }
    }

    pub fn expr(expr: Expr) -> Stmt {
        Stmt::new(StmtKind::Expr { expr })
    }
    pub fn ret(argument: Option<Expr>) -> Stmt {
        Stmt::new(StmtKind::Return { argument })
    }
    pub fn throw(argument: Expr) -> Stmt {
        Stmt::new(StmtKind::Throw { argument })
    }
    pub fn if_(test: Expr, consequent: Vec<Stmt>, alternate: Option<Vec<Stmt>>) -> Stmt {
        Stmt::new(StmtKind::If {
            test,
            consequent: Box::new(block(consequent)),
            alternate: alternate.map(|body| Box::new(block(body))),
        })
    }
    pub fn block(body: Vec<Stmt>) -> Stmt {
        Stmt::new(StmtKind::Block { body })
    }
    pub fn for_of(kind: VarKind, binding: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::new(StmtKind::ForOf(ForOf {
            kind,
            binding: Ident::new(binding),
            annotation: None,
            iterable,
            body: Box::new(block(body)),
        }))
    }
    pub fn while_(test: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::new(StmtKind::While {
            test,
            body: Box::new(block(body)),
        })
    }

    pub fn export(declaration: Stmt) -> Stmt {
        Stmt::new(StmtKind::Export {
            declaration: Box::new(declaration),
        })
    }
    pub fn export_named(names: &[&str]) -> Stmt {
        Stmt::new(StmtKind::ExportNamed {
            specifiers: names
                .iter()
                .map(|name| ExportSpecifier {
                    local: Ident::new(*name),
                    exported: None,
                })
                .collect(),
        })
    }
    pub fn export_default(expr: Expr) -> Stmt {
        Stmt::new(StmtKind::ExportDefault { expr })
    }
    pub fn module_exports(expr: Expr) -> Stmt {
        Stmt::new(StmtKind::ModuleExports { expr })
    }
    pub fn import_named(source: &str, names: &[&str]) -> Stmt {
        Stmt::new(StmtKind::Import(ImportDecl {
            source: source.to_string(),
            kind: ImportKind::Named {
                specifiers: names
                    .iter()
                    .map(|name| ImportSpecifier {
                        imported: (*name).to_string(),
                        local: Ident::new(*name),
                    })
                    .collect(),
            },
            type_only: false,
        }))
    }
    pub fn import_type(source: &str, names: &[&str]) -> Stmt {
        let mut stmt = import_named(source, names);
        if let StmtKind::Import(decl) = &mut stmt.kind {
            decl.type_only = true;
        }
        stmt
    }
    pub fn import_namespace(source: &str, local: &str) -> Stmt {
        Stmt::new(StmtKind::Import(ImportDecl {
            source: source.to_string(),
            kind: ImportKind::Namespace {
                local: Ident::new(local),
            },
            type_only: false,
        }))
    }

    pub fn module(name: &str, body: Vec<Stmt>) -> Module {
        Module {
            name: name.to_string(),
            source: String::new(),
            body,
        }
    }
}
