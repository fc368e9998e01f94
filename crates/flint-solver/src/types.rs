//! Type representation.
//!
//! Types are values of [`TypeData`] interned into a [`TypeInterner`]
//! (`crate::intern`) and referred to by [`TypeId`]. Two types are equal
//! exactly when their ids are equal.
//!
//! Named and recursive types are never unrolled: a reference to a type alias
//! is a `Lazy(DefId)` node resolved on demand, which gives self-referential
//! definitions an explicit back-edge in the graph.

use crate::def::DefId;
use flint_common::Atom;

// =============================================================================
// TypeId
// =============================================================================

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Absent type. In explicit type argument lists it marks a `_`
    /// placeholder that should be inferred.
    pub const NONE: Self = Self(0);
    /// Recovery type produced after a reported error. Compatible with
    /// everything so one error does not cascade.
    pub const ERROR: Self = Self(1);
    /// `empty`, the bottom type.
    pub const NEVER: Self = Self(2);
    /// `mixed`, the top type.
    pub const UNKNOWN: Self = Self(3);
    pub const ANY: Self = Self(4);
    pub const VOID: Self = Self(5);
    pub const NULL: Self = Self(6);
    pub const BOOLEAN: Self = Self(7);
    pub const NUMBER: Self = Self(8);
    pub const STRING: Self = Self(9);
    pub const BIGINT: Self = Self(10);
    pub const SYMBOL: Self = Self(11);
    pub const BOOLEAN_TRUE: Self = Self(12);
    pub const BOOLEAN_FALSE: Self = Self(13);
    /// `React.Node`, the type of anything renderable.
    pub const REACT_NODE: Self = Self(14);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_any_or_error(self) -> bool {
        self.0 == Self::ANY.0 || self.0 == Self::ERROR.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Error,
    Never,
    Unknown,
    Any,
    Void,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    ReactNode,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            Self::Error => TypeId::ERROR,
            Self::Never => TypeId::NEVER,
            Self::Unknown => TypeId::UNKNOWN,
            Self::Any => TypeId::ANY,
            Self::Void => TypeId::VOID,
            Self::Null => TypeId::NULL,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Number => TypeId::NUMBER,
            Self::String => TypeId::STRING,
            Self::Bigint => TypeId::BIGINT,
            Self::Symbol => TypeId::SYMBOL,
            Self::ReactNode => TypeId::REACT_NODE,
        }
    }

    pub const fn from_type_id(id: TypeId) -> Option<Self> {
        Some(match id.0 {
            1 => Self::Error,
            2 => Self::Never,
            3 => Self::Unknown,
            4 => Self::Any,
            5 => Self::Void,
            6 => Self::Null,
            7 => Self::Boolean,
            8 => Self::Number,
            9 => Self::String,
            10 => Self::Bigint,
            11 => Self::Symbol,
            14 => Self::ReactNode,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "any",
            Self::Never => "empty",
            Self::Unknown => "mixed",
            Self::Any => "any",
            Self::Void => "void",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Bigint => "bigint",
            Self::Symbol => "symbol",
            Self::ReactNode => "React.Node",
        }
    }
}

// =============================================================================
// Literals
// =============================================================================

/// Bit pattern of an `f64`, normalized so that equal numbers hash equally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NumberBits(u64);

impl NumberBits {
    pub fn from_f64(value: f64) -> Self {
        if value == 0.0 {
            Self(0.0f64.to_bits())
        } else if value.is_nan() {
            Self(f64::NAN.to_bits())
        } else {
            Self(value.to_bits())
        }
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(NumberBits),
    Boolean(bool),
    BigInt(Atom),
}

impl LiteralValue {
    /// The primitive type this literal belongs to.
    pub const fn primitive(self) -> TypeId {
        match self {
            Self::String(_) => TypeId::STRING,
            Self::Number(_) => TypeId::NUMBER,
            Self::Boolean(_) => TypeId::BOOLEAN,
            Self::BigInt(_) => TypeId::BIGINT,
        }
    }
}

// =============================================================================
// Objects
// =============================================================================

/// Read/write capability of a property or indexer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variance {
    #[default]
    ReadWrite,
    /// `+p`, compared covariantly.
    ReadOnly,
    /// `-p`, compared contravariantly.
    WriteOnly,
}

impl Variance {
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::WriteOnly)
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }

    pub const fn sigil(self) -> &'static str {
        match self {
            Self::ReadWrite => "",
            Self::ReadOnly => "+",
            Self::WriteOnly => "-",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub variance: Variance,
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
            variance: Variance::ReadWrite,
            is_method: false,
        }
    }

    pub fn opt(name: Atom, type_id: TypeId) -> Self {
        Self {
            optional: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn readonly(name: Atom, type_id: TypeId) -> Self {
        Self {
            variance: Variance::ReadOnly,
            ..Self::new(name, type_id)
        }
    }

    pub fn method(name: Atom, type_id: TypeId) -> Self {
        Self {
            variance: Variance::ReadOnly,
            is_method: true,
            ..Self::new(name, type_id)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub variance: Variance,
}

/// Structural object type. Property order is declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    pub indexer: Option<IndexSignature>,
    pub exact: bool,
}

impl ObjectShape {
    pub fn exact(properties: Vec<PropertyInfo>) -> Self {
        Self {
            properties,
            indexer: None,
            exact: true,
        }
    }

    pub fn inexact(properties: Vec<PropertyInfo>) -> Self {
        Self {
            properties,
            indexer: None,
            exact: false,
        }
    }

    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_key(&self, name: Atom) -> bool {
        self.property(name).is_some()
    }
}

// =============================================================================
// Functions and generics
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub fn required(type_id: TypeId) -> Self {
        Self {
            name: None,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

/// `x is T` on a function signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypePredicate {
    pub param_index: u32,
    pub type_id: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub predicate: Option<TypePredicate>,
}

impl FunctionShape {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        Self {
            type_params: Vec::new(),
            params,
            return_type,
            predicate: None,
        }
    }

    /// Number of parameters a caller has to supply.
    pub fn required_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.optional && !p.rest)
            .count()
    }

    pub fn has_rest(&self) -> bool {
        self.params.last().is_some_and(|p| p.rest)
    }
}

/// A declared type parameter: `T: Bound = Default`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
    pub default: Option<TypeId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            bound: None,
            default: None,
        }
    }
}

/// `Base<Args...>` where `Base` is an alias (`Lazy`) or an opaque type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

// =============================================================================
// Type destructors
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// Where a mapped type draws its keys from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeySource {
    /// `keyof O`: homomorphic over `O`.
    KeyOf(TypeId),
    /// Any other key set, e.g. `'a' | 'b'` or a type parameter.
    Keys(TypeId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    pub key_param: TypeParamInfo,
    pub source: KeySource,
    pub template: TypeId,
    pub optional: Option<MappedModifier>,
    pub variance: Option<Variance>,
}

impl MappedType {
    pub const fn is_homomorphic(&self) -> bool {
        matches!(self.source, KeySource::KeyOf(_))
    }

    pub const fn source_type(&self) -> TypeId {
        match self.source {
            KeySource::KeyOf(t) | KeySource::Keys(t) => t,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
}

// =============================================================================
// Protocol and component types
// =============================================================================

/// `$Iterator<Yield, Return, Next>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IteratorType {
    pub yield_type: TypeId,
    pub return_type: TypeId,
    pub next_type: TypeId,
}

/// `React.AbstractComponent`: what a component accepts and produces.
///
/// `config` is what callers pass (props with defaulted fields optional);
/// `props` is what the implementation receives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentType {
    pub props: TypeId,
    pub instance: TypeId,
    pub config: TypeId,
    pub renders: TypeId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Map,
    Set,
    Promise,
}

impl BuiltinKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Set => "Set",
            Self::Promise => "Promise",
        }
    }

    pub const fn arity(self) -> usize {
        match self {
            Self::Map => 2,
            Self::Set | Self::Promise => 1,
        }
    }
}

// =============================================================================
// Interned ids
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplicationId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedTypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalTypeId(pub u32);

// =============================================================================
// TypeData
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Object(ObjectShapeId),
    Union(TypeListId),
    Intersection(TypeListId),
    Array { element: TypeId, readonly: bool },
    Tuple(TypeListId),
    Function(FunctionShapeId),
    TypeParameter(TypeParamInfo),
    /// `infer V` inside a conditional's `extends` clause.
    Infer(TypeParamInfo),
    Application(TypeApplicationId),
    /// Reference to a type alias, resolved on demand.
    Lazy(DefId),
    Mapped(MappedTypeId),
    KeyOf(TypeId),
    IndexAccess(TypeId, TypeId),
    Conditional(ConditionalTypeId),
    Opaque(DefId),
    Iterator(IteratorType),
    Component(ComponentType),
    /// `React.Element<C>`, the value of a JSX expression.
    Element(TypeId),
    Builtin(BuiltinKind, TypeListId),
    /// `{...A, ...B}` whose operands are not all concrete objects yet.
    Spread(TypeListId, bool),
    /// `$ReadOnly<T>` (`deep == false`) or `$ReactDeepReadOnly<T>`.
    ReadOnly { inner: TypeId, deep: bool },
    /// `$Diff<A, B>`
    Diff(TypeId, TypeId),
    /// Instance of a class.
    Instance(DefId),
    /// A class as a value (`Class<C>`).
    Class(DefId),
}
