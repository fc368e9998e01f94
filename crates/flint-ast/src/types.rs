//! Type annotation nodes.

use flint_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    #[serde(flatten)]
    pub kind: TypeNodeKind,
    #[serde(default)]
    pub span: Span,
}

impl TypeNode {
    pub fn new(kind: TypeNodeKind) -> Self {
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
pub enum Keyword {
    Number,
    String,
    Boolean,
    Bigint,
    Symbol,
    Void,
    Null,
    Mixed,
    Empty,
    Any,
}

/// `+` / `-` prefix on a property, indexer or mapped type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarianceAnnotation {
    #[default]
    None,
    Plus,
    Minus,
}

/// `+?` / `-?` on a mapped type. A bare `?` is `Add`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionalModifier {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeNodeKind {
    Keyword {
        keyword: Keyword,
    },
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    /// A (possibly dotted) name with optional type arguments:
    /// `Box`, `React.Node`, `Map<string, number>`.
    Reference {
        name: String,
        #[serde(default)]
        args: Vec<TypeNode>,
    },
    Object {
        exact: bool,
        members: Vec<ObjectMember>,
    },
    Union {
        members: Vec<TypeNode>,
    },
    Intersection {
        members: Vec<TypeNode>,
    },
    /// `?T`
    Nullable {
        inner: Box<TypeNode>,
    },
    /// `T[]`
    Array {
        element: Box<TypeNode>,
    },
    Tuple {
        elements: Vec<TypeNode>,
    },
    Function(FunctionTypeNode),
    /// `typeof x`
    Typeof {
        name: String,
    },
    /// `keyof T`
    KeyOf {
        inner: Box<TypeNode>,
    },
    /// `T[K]`
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    Mapped(MappedTypeNode),
    /// `C extends E ? T : F`
    #[serde(rename_all = "camelCase")]
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    /// `infer V`
    Infer {
        name: String,
    },
    /// `_` in an explicit type argument list: infer this argument.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "camelCase")]
pub enum ObjectMember {
    #[serde(rename_all = "camelCase")]
    Property {
        name: String,
        value: TypeNode,
        #[serde(default)]
        optional: bool,
        #[serde(default)]
        variance: VarianceAnnotation,
        #[serde(default)]
        method: bool,
        #[serde(default)]
        span: Span,
    },
    Indexer {
        key: TypeNode,
        value: TypeNode,
        #[serde(default)]
        variance: VarianceAnnotation,
    },
    Spread {
        argument: TypeNode,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParamNode {
    pub name: String,
    #[serde(default)]
    pub bound: Option<TypeNode>,
    #[serde(default)]
    pub default: Option<TypeNode>,
    #[serde(default)]
    pub variance: VarianceAnnotation,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionTypeParam {
    #[serde(default)]
    pub name: Option<String>,
    pub annotation: TypeNode,
    #[serde(default)]
    pub optional: bool,
}

/// `x is T` / `implies x is T` on a function return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeGuardNode {
    pub param: String,
    pub annotation: Box<TypeNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionTypeNode {
    #[serde(default)]
    pub type_params: Vec<TypeParamNode>,
    #[serde(default)]
    pub params: Vec<FunctionTypeParam>,
    #[serde(default)]
    pub rest: Option<Box<FunctionTypeParam>>,
    pub ret: Box<TypeNode>,
    #[serde(default)]
    pub guard: Option<TypeGuardNode>,
}

/// `{[K in S]: V}` with optional `+`/`-` and `?`/`-?` modifiers.
///
/// The mapped type is homomorphic when `source` is a `KeyOf` node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedTypeNode {
    pub key: String,
    pub source: Box<TypeNode>,
    pub value: Box<TypeNode>,
    #[serde(default)]
    pub optional: Option<OptionalModifier>,
    #[serde(default)]
    pub variance: VarianceAnnotation,
}
