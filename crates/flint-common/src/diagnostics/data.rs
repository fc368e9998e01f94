//! Diagnostic codes and message templates.

use super::{DiagnosticMessage, Severity};

pub mod diagnostic_codes {
    pub const INCOMPATIBLE_TYPE: u32 = 1001;
    pub const ARITY_MISMATCH: u32 = 1002;
    pub const MISSING_PROPERTY: u32 = 1003;
    pub const BOUND_VIOLATION: u32 = 1004;
    pub const UNREACHABLE_CODE: u32 = 1005;
    pub const MALFORMED_ANNOTATION: u32 = 1006;
    pub const INVALID_REASSIGNMENT: u32 = 1007;
    pub const NOT_ITERABLE: u32 = 1008;
    pub const UNRESOLVED_NAME: u32 = 1009;
    pub const NOT_A_COMPONENT: u32 = 1010;
    pub const NOT_CALLABLE: u32 = 1011;
}

pub mod diagnostic_messages {
    pub const INCOMPATIBLE_TYPE: &str = "{0} is incompatible with {1}.";
    pub const TOO_MANY_TYPE_ARGUMENTS: &str =
        "Cannot apply {0} because at most {1} type arguments are expected, but {2} were supplied.";
    pub const TOO_FEW_TYPE_ARGUMENTS: &str =
        "Cannot apply {0} because at least {1} type arguments are expected, but {2} were supplied.";
    pub const TOO_MANY_ARGUMENTS: &str =
        "Cannot call {0} because at most {1} arguments are expected, but {2} were supplied.";
    pub const TOO_FEW_ARGUMENTS: &str =
        "Cannot call {0} because at least {1} arguments are expected, but {2} were supplied.";
    pub const MISSING_PROPERTY: &str = "Property `{0}` is missing in {1}.";
    pub const BOUND_VIOLATION: &str =
        "{0} is incompatible with the bound {1} of type parameter `{2}`.";
    pub const UNREACHABLE_CODE: &str = "Unreachable code.";
    pub const MALFORMED_ANNOTATION: &str = "Malformed type annotation: {0}.";
    pub const INVALID_REASSIGNMENT: &str = "Cannot reassign `{0}` because {1}.";
    pub const NOT_ITERABLE: &str = "{0} is not iterable.";
    pub const UNRESOLVED_NAME: &str = "Cannot resolve name `{0}`.";
    pub const NOT_A_COMPONENT: &str = "{0} is not a React component.";
    pub const NOT_CALLABLE: &str = "Cannot call {0} because it is not a function.";

    // Explanation nodes
    pub const PROPERTY_INCOMPATIBLE: &str = "In property `{0}`:";
    pub const PROPERTY_MISSING: &str = "Property `{0}` is missing in {1} but exists in {2}.";
    pub const PROPERTY_OPTIONAL: &str = "Property `{0}` is optional in {1} but required in {2}.";
    pub const PROPERTY_NOT_READABLE: &str = "Property `{0}` is not readable in {1}.";
    pub const PROPERTY_NOT_WRITABLE: &str = "Property `{0}` is not writable in {1}.";
    pub const PROPERTY_EXTRA: &str = "Property `{0}` is missing in exact {1}.";
    pub const INEXACT_TO_EXACT: &str = "Inexact {0} is incompatible with exact {1}.";
    pub const PARAMETER_INCOMPATIBLE: &str = "In the {0} parameter:";
    pub const RETURN_INCOMPATIBLE: &str = "In the return value:";
    pub const TOO_FEW_PARAMETERS: &str = "{0} requires more arguments than {1} provides.";
    pub const ELEMENT_INCOMPATIBLE: &str = "In element {0}:";
    pub const ARRAY_ELEMENT_INCOMPATIBLE: &str = "In the array element:";
    pub const ITERATED_ELEMENT_INCOMPATIBLE: &str = "In the iterated element of {0}:";
    pub const TUPLE_ARITY: &str = "Tuple of length {0} is incompatible with tuple of length {1}.";
    pub const TYPE_ARGUMENT_INCOMPATIBLE: &str = "In type argument `{0}`:";
    pub const NO_UNION_MEMBER: &str = "{0} does not match any member of {1}.";
    pub const INDEXER_INCOMPATIBLE: &str = "In the indexer:";
    pub const READ_ONLY_CONVERSION: &str = "{0} is read-only, but {1} requires writes.";
}

use diagnostic_codes as c;
use diagnostic_messages as m;

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: c::INCOMPATIBLE_TYPE,
        severity: Severity::Error,
        message: m::INCOMPATIBLE_TYPE,
    },
    DiagnosticMessage {
        code: c::ARITY_MISMATCH,
        severity: Severity::Error,
        message: m::TOO_MANY_TYPE_ARGUMENTS,
    },
    DiagnosticMessage {
        code: c::MISSING_PROPERTY,
        severity: Severity::Error,
        message: m::MISSING_PROPERTY,
    },
    DiagnosticMessage {
        code: c::BOUND_VIOLATION,
        severity: Severity::Error,
        message: m::BOUND_VIOLATION,
    },
    DiagnosticMessage {
        code: c::UNREACHABLE_CODE,
        severity: Severity::Warning,
        message: m::UNREACHABLE_CODE,
    },
    DiagnosticMessage {
        code: c::MALFORMED_ANNOTATION,
        severity: Severity::Error,
        message: m::MALFORMED_ANNOTATION,
    },
    DiagnosticMessage {
        code: c::INVALID_REASSIGNMENT,
        severity: Severity::Error,
        message: m::INVALID_REASSIGNMENT,
    },
    DiagnosticMessage {
        code: c::NOT_ITERABLE,
        severity: Severity::Error,
        message: m::NOT_ITERABLE,
    },
    DiagnosticMessage {
        code: c::UNRESOLVED_NAME,
        severity: Severity::Error,
        message: m::UNRESOLVED_NAME,
    },
    DiagnosticMessage {
        code: c::NOT_A_COMPONENT,
        severity: Severity::Error,
        message: m::NOT_A_COMPONENT,
    },
    DiagnosticMessage {
        code: c::NOT_CALLABLE,
        severity: Severity::Error,
        message: m::NOT_CALLABLE,
    },
];
