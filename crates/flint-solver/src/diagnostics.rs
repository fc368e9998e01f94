//! Subtype failure witnesses.
//!
//! When a subtype check fails, the checker returns a [`SubtypeFailureReason`]
//! describing the first failing branch. Structural rules wrap the reason of
//! the nested comparison, so the value is a chain from the outer types down
//! to the pair that actually disagreed. The reporter turns the chain into
//! the `extraInfo` tree of a diagnostic.

use crate::format::TypePrinter;
use crate::types::TypeId;
use flint_common::diagnostics::{ExtraInfo, diagnostic_messages as m, format_message};
use flint_common::Atom;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// Leaf: two types with no structural relationship.
    TypeMismatch { source: TypeId, target: TypeId },
    MissingProperty {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    /// Optional in the source, required in the target.
    OptionalProperty {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    PropertyNotReadable { property: Atom, source: TypeId },
    PropertyNotWritable { property: Atom, source: TypeId },
    /// Source has a key the exact target does not.
    ExtraProperty { property: Atom, target: TypeId },
    InexactToExact { source: TypeId, target: TypeId },
    PropertyMismatch {
        property: Atom,
        nested: Box<SubtypeFailureReason>,
    },
    IndexerMismatch { nested: Box<SubtypeFailureReason> },
    ParameterMismatch {
        index: usize,
        nested: Box<SubtypeFailureReason>,
    },
    ReturnMismatch { nested: Box<SubtypeFailureReason> },
    /// The source function requires more arguments than the target passes.
    TooFewParameters { source: TypeId, target: TypeId },
    ArrayElementMismatch { nested: Box<SubtypeFailureReason> },
    TupleElementMismatch {
        index: usize,
        nested: Box<SubtypeFailureReason>,
    },
    TupleArity { source_len: usize, target_len: usize },
    TypeArgumentMismatch {
        name: &'static str,
        nested: Box<SubtypeFailureReason>,
    },
    IteratedElementMismatch {
        source: TypeId,
        nested: Box<SubtypeFailureReason>,
    },
    NoUnionMember { source: TypeId, target: TypeId },
    /// Read-only array or object passed where writes are required.
    ReadOnlyConversion { source: TypeId, target: TypeId },
}

impl SubtypeFailureReason {
    pub fn mismatch(source: TypeId, target: TypeId) -> Self {
        Self::TypeMismatch { source, target }
    }

    pub fn nested(&self) -> Option<&SubtypeFailureReason> {
        match self {
            Self::PropertyMismatch { nested, .. }
            | Self::IndexerMismatch { nested }
            | Self::ParameterMismatch { nested, .. }
            | Self::ReturnMismatch { nested }
            | Self::ArrayElementMismatch { nested }
            | Self::TupleElementMismatch { nested, .. }
            | Self::TypeArgumentMismatch { nested, .. }
            | Self::IteratedElementMismatch { nested, .. } => Some(nested),
            _ => None,
        }
    }

    /// The innermost reason of the chain.
    pub fn root_cause(&self) -> &SubtypeFailureReason {
        let mut current = self;
        while let Some(next) = current.nested() {
            current = next;
        }
        current
    }

    /// Number of links in the chain.
    pub fn depth(&self) -> usize {
        1 + self.nested().map_or(0, SubtypeFailureReason::depth)
    }

    /// Render this chain as a nested explanation.
    pub fn to_extra_info(&self, printer: &mut TypePrinter<'_>) -> ExtraInfo {
        let message = self.message(printer);
        let node = ExtraInfo::leaf(message);
        match self.nested() {
            Some(nested) => node.with_child(nested.to_extra_info(printer)),
            None => node,
        }
    }

    fn message(&self, printer: &mut TypePrinter<'_>) -> String {
        match self {
            Self::TypeMismatch { source, target } => {
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::INCOMPATIBLE_TYPE, &[&s, &t])
            }
            Self::MissingProperty {
                property,
                source,
                target,
            } => {
                let name = printer.atom(*property);
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::PROPERTY_MISSING, &[&name, &s, &t])
            }
            Self::OptionalProperty {
                property,
                source,
                target,
            } => {
                let name = printer.atom(*property);
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::PROPERTY_OPTIONAL, &[&name, &s, &t])
            }
            Self::PropertyNotReadable { property, source } => {
                let name = printer.atom(*property);
                let s = printer.print(*source);
                format_message(m::PROPERTY_NOT_READABLE, &[&name, &s])
            }
            Self::PropertyNotWritable { property, source } => {
                let name = printer.atom(*property);
                let s = printer.print(*source);
                format_message(m::PROPERTY_NOT_WRITABLE, &[&name, &s])
            }
            Self::ExtraProperty { property, target } => {
                let name = printer.atom(*property);
                let t = printer.print(*target);
                format_message(m::PROPERTY_EXTRA, &[&name, &t])
            }
            Self::InexactToExact { source, target } => {
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::INEXACT_TO_EXACT, &[&s, &t])
            }
            Self::PropertyMismatch { property, .. } => {
                let name = printer.atom(*property);
                format_message(m::PROPERTY_INCOMPATIBLE, &[&name])
            }
            Self::IndexerMismatch { .. } => m::INDEXER_INCOMPATIBLE.to_string(),
            Self::ParameterMismatch { index, .. } => {
                format_message(m::PARAMETER_INCOMPATIBLE, &[ordinal(*index)])
            }
            Self::ReturnMismatch { .. } => m::RETURN_INCOMPATIBLE.to_string(),
            Self::TooFewParameters { source, target } => {
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::TOO_FEW_PARAMETERS, &[&s, &t])
            }
            Self::ArrayElementMismatch { .. } => m::ARRAY_ELEMENT_INCOMPATIBLE.to_string(),
            Self::TupleElementMismatch { index, .. } => {
                format_message(m::ELEMENT_INCOMPATIBLE, &[&index.to_string()])
            }
            Self::TupleArity {
                source_len,
                target_len,
            } => format_message(
                m::TUPLE_ARITY,
                &[&source_len.to_string(), &target_len.to_string()],
            ),
            Self::TypeArgumentMismatch { name, .. } => {
                format_message(m::TYPE_ARGUMENT_INCOMPATIBLE, &[*name])
            }
            Self::IteratedElementMismatch { source, .. } => {
                let s = printer.print(*source);
                format_message(m::ITERATED_ELEMENT_INCOMPATIBLE, &[&s])
            }
            Self::NoUnionMember { source, target } => {
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::NO_UNION_MEMBER, &[&s, &t])
            }
            Self::ReadOnlyConversion { source, target } => {
                let (s, t) = (printer.print(*source), printer.print(*target));
                format_message(m::READ_ONLY_CONVERSION, &[&s, &t])
            }
        }
    }
}

fn ordinal(index: usize) -> &'static str {
    match index {
        0 => "first",
        1 => "second",
        2 => "third",
        3 => "fourth",
        4 => "fifth",
        _ => "next",
    }
}
