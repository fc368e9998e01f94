//! Statement and expression IR.

use crate::types::{TypeNode, TypeParamNode, VarianceAnnotation};
use flint_common::Span;
use serde::{Deserialize, Serialize};

/// A whole checking input: every compilation unit of the program.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub modules: Vec<Module>,
}

/// One compilation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module specifier other modules import it by (e.g. `./lib`).
    pub name: String,
    /// Source text, used only for diagnostic context lines.
    #[serde(default)]
    pub source: String,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarKind {
    Let,
    Const,
    Var,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(flatten)]
    pub kind: StmtKind,
    #[serde(default)]
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StmtKind {
    VarDecl(VarDecl),
    /// `const {a, b: c, ...rest} = init;`
    Destructure(ObjectPattern),
    FunctionDecl(Function),
    ClassDecl(ClassDecl),
    ComponentDecl(ComponentDecl),
    /// `declare function f(): T;`
    DeclareFunction {
        name: Ident,
        annotation: TypeNode,
    },
    /// `declare var x: T;` / `declare const x: T;`
    DeclareVar {
        kind: VarKind,
        name: Ident,
        annotation: TypeNode,
    },
    TypeAlias(TypeAlias),
    OpaqueType(OpaqueTypeDecl),
    Expr {
        expr: Expr,
    },
    Return {
        #[serde(default)]
        argument: Option<Expr>,
    },
    Throw {
        argument: Expr,
    },
    If {
        test: Expr,
        consequent: Box<Stmt>,
        #[serde(default)]
        alternate: Option<Box<Stmt>>,
    },
    Block {
        body: Vec<Stmt>,
    },
    ForOf(ForOf),
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    /// `export <declaration>`
    Export {
        declaration: Box<Stmt>,
    },
    /// `export { a, b as c };`
    ExportNamed {
        specifiers: Vec<ExportSpecifier>,
    },
    ExportDefault {
        expr: Expr,
    },
    /// `module.exports = <expr>;`
    ModuleExports {
        expr: Expr,
    },
    Import(ImportDecl),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub name: Ident,
    #[serde(default)]
    pub annotation: Option<TypeNode>,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectPattern {
    pub kind: VarKind,
    pub properties: Vec<PatternProperty>,
    #[serde(default)]
    pub rest: Option<Ident>,
    #[serde(default)]
    pub annotation: Option<TypeNode>,
    pub init: Expr,
}

impl ObjectPattern {
    /// Every name the pattern binds, rest last.
    pub fn bindings(&self) -> impl Iterator<Item = &Ident> {
        self.properties.iter().map(|p| &p.binding).chain(self.rest.iter())
    }
}

/// `key` or `key: binding` inside an object pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternProperty {
    pub key: String,
    pub binding: Ident,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    #[serde(default)]
    pub annotation: Option<TypeNode>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    #[serde(default)]
    pub name: Option<Ident>,
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub ret: Option<TypeNode>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
    #[serde(default)]
    pub is_arrow: bool,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    pub name: Ident,
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    /// Superclass reference, e.g. `React.Component<Props>`.
    #[serde(default)]
    pub extends: Option<TypeNode>,
    #[serde(default)]
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "camelCase")]
pub enum ClassMember {
    #[serde(rename_all = "camelCase")]
    Property {
        name: Ident,
        #[serde(default)]
        annotation: Option<TypeNode>,
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        variance: VarianceAnnotation,
    },
    #[serde(rename_all = "camelCase")]
    Method {
        function: Function,
        #[serde(default)]
        is_static: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RendersKind {
    /// `renders T`
    Normal,
    /// `renders? T`
    Maybe,
    /// `renders* T`
    Star,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendersAnnotation {
    pub kind: RendersKind,
    pub annotation: TypeNode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentParam {
    pub name: Ident,
    pub annotation: TypeNode,
    #[serde(default)]
    pub optional: bool,
}

/// `component Foo(a: T, ...) renders R { ... }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDecl {
    pub name: Ident,
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    #[serde(default)]
    pub params: Vec<ComponentParam>,
    #[serde(default)]
    pub renders: Option<RendersAnnotation>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAlias {
    pub name: Ident,
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    pub body: TypeNode,
}

/// `opaque type T: Bound = Body;` or, without a body,
/// `declare opaque type T: Bound;`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueTypeDecl {
    pub name: Ident,
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    #[serde(default)]
    pub bound: Option<TypeNode>,
    #[serde(default)]
    pub body: Option<TypeNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForOf {
    pub kind: VarKind,
    pub binding: Ident,
    #[serde(default)]
    pub annotation: Option<TypeNode>,
    pub iterable: Expr,
    pub body: Box<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: Ident,
    #[serde(default)]
    pub exported: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportKind {
    /// `import {a, b as c} from '...'`
    Named { specifiers: Vec<ImportSpecifier> },
    /// `import * as NS from '...'`
    Namespace { local: Ident },
    /// `import D from '...'`
    Default { local: Ident },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: Ident,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    pub source: String,
    #[serde(flatten)]
    pub kind: ImportKind,
    #[serde(default)]
    pub type_only: bool,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    StrictEq,
    StrictNotEq,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    InstanceOf,
    In,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    Not,
    Typeof,
    Minus,
    Void,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExprKind {
    Ident {
        name: String,
    },
    Null,
    Bool {
        value: bool,
    },
    Number {
        value: f64,
    },
    String {
        value: String,
    },
    Object {
        properties: Vec<ObjectProp>,
    },
    Array {
        elements: Vec<Expr>,
    },
    #[serde(rename_all = "camelCase")]
    Member {
        object: Box<Expr>,
        property: String,
        #[serde(default)]
        property_span: Span,
    },
    #[serde(rename_all = "camelCase")]
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        type_args: Option<Vec<TypeNode>>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    #[serde(rename_all = "camelCase")]
    New {
        callee: Box<Expr>,
        #[serde(default)]
        type_args: Option<Vec<TypeNode>>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Function(Box<Function>),
    Await {
        argument: Box<Expr>,
    },
    Yield {
        #[serde(default)]
        argument: Option<Box<Expr>>,
        #[serde(default)]
        delegate: bool,
    },
    /// `expr as T` / `(expr: T)`
    Cast {
        expr: Box<Expr>,
        annotation: TypeNode,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        argument: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// `target = value`; `target` is an identifier or a member expression.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Jsx(JsxElement),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "prop", rename_all = "camelCase")]
pub enum ObjectProp {
    #[serde(rename_all = "camelCase")]
    Init {
        key: String,
        #[serde(default)]
        key_span: Span,
        value: Expr,
    },
    /// `{ e }`
    Shorthand { name: Ident },
    Spread { argument: Expr },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxElement {
    pub name: String,
    #[serde(default)]
    pub name_span: Span,
    #[serde(default)]
    pub type_args: Option<Vec<TypeNode>>,
    #[serde(default)]
    pub attributes: Vec<JsxAttribute>,
    #[serde(default)]
    pub children: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attr", rename_all = "camelCase")]
pub enum JsxAttribute {
    /// `name={value}`; a bare `name` has no value and means `true`.
    Attr {
        name: Ident,
        #[serde(default)]
        value: Option<Expr>,
    },
    Spread { argument: Expr },
}
