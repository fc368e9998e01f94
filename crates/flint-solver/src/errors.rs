//! Checker error taxonomy.
//!
//! Every variant except `MalformedAnnotation` is recoverable: the caller
//! records it and continues with a recovery type.

use crate::diagnostics::SubtypeFailureReason;
use crate::types::TypeId;
use flint_common::Atom;
use flint_common::diagnostics::diagnostic_codes;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArityKind {
    TooMany,
    TooFew,
}

/// What the arity applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArityTarget {
    TypeArguments,
    Arguments,
}

/// Why a binding may not be written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReassignmentReason {
    Const,
    Import,
    NamespaceImport,
    DeclaredFunction,
    /// Exported binding, whole-program mode.
    Exported,
}

impl ReassignmentReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Const => "it is a constant",
            Self::Import => "it is an import binding",
            Self::NamespaceImport => "it is a member of a namespace import",
            Self::DeclaredFunction => "it is a declared function",
            Self::Exported => "it is exported and its type is part of the module signature",
        }
    }
}

pub type CheckResult<T> = Result<T, CheckError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CheckError {
    #[error("type {lower:?} is incompatible with {upper:?}")]
    IncompatibleType {
        lower: TypeId,
        upper: TypeId,
        trace: Option<Box<SubtypeFailureReason>>,
    },

    #[error("{name}: expected {expected} {target:?}, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
        kind: ArityKind,
        target: ArityTarget,
    },

    #[error("property {key:?} is missing in {on_type:?}")]
    MissingProperty { key: Atom, on_type: TypeId },

    #[error("{arg:?} violates the bound {bound:?} of {param:?}")]
    BoundViolation {
        param: Atom,
        bound: TypeId,
        arg: TypeId,
    },

    #[error("unreachable code")]
    UnreachableCode,

    #[error("malformed annotation: {reason}")]
    MalformedAnnotation { reason: String },

    #[error("cannot reassign {name:?}: {}", .reason.describe())]
    InvalidReassignment {
        name: Atom,
        reason: ReassignmentReason,
    },

    #[error("{ty:?} is not iterable")]
    NotIterable { ty: TypeId },

    #[error("cannot resolve name {name:?}")]
    UnresolvedName { name: Atom },

    #[error("{ty:?} is not a component")]
    NotAComponent { ty: TypeId },

    #[error("{ty:?} is not callable")]
    NotCallable { ty: TypeId },
}

impl CheckError {
    pub fn incompatible(lower: TypeId, upper: TypeId, reason: SubtypeFailureReason) -> Self {
        Self::IncompatibleType {
            lower,
            upper,
            trace: Some(Box::new(reason)),
        }
    }

    pub const fn code(&self) -> u32 {
        match self {
            Self::IncompatibleType { .. } => diagnostic_codes::INCOMPATIBLE_TYPE,
            Self::Arity { .. } => diagnostic_codes::ARITY_MISMATCH,
            Self::MissingProperty { .. } => diagnostic_codes::MISSING_PROPERTY,
            Self::BoundViolation { .. } => diagnostic_codes::BOUND_VIOLATION,
            Self::UnreachableCode => diagnostic_codes::UNREACHABLE_CODE,
            Self::MalformedAnnotation { .. } => diagnostic_codes::MALFORMED_ANNOTATION,
            Self::InvalidReassignment { .. } => diagnostic_codes::INVALID_REASSIGNMENT,
            Self::NotIterable { .. } => diagnostic_codes::NOT_ITERABLE,
            Self::UnresolvedName { .. } => diagnostic_codes::UNRESOLVED_NAME,
            Self::NotAComponent { .. } => diagnostic_codes::NOT_A_COMPONENT,
            Self::NotCallable { .. } => diagnostic_codes::NOT_CALLABLE,
        }
    }

    /// Fatal errors abort the enclosing module.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedAnnotation { .. })
    }

    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::UnreachableCode)
    }
}
