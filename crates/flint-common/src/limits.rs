//! Centralized limits and thresholds for the checker.
//!
//! Recursion limits for the solver's own traversals live in
//! `flint_solver::recursion::RecursionProfile`. The values here are the
//! defaults for user-tunable `CheckerOptions` and the limits shared by
//! checker and solver.

/// Default maximum depth for subtype checking before the comparison is
/// assumed to hold.
///
/// Deeply nested structural types (e.g. a chain of 200 nested object
/// literals) are accepted past this depth rather than overflowing the stack.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Default maximum depth for type evaluation (aliases, applications,
/// mapped types, conditional types).
///
/// ```flow
/// type Rec = null | Rec;          // back-edge, dropped on normalization
/// type Deep<T> = {next: Deep<T>}; // expansion stops at this depth
/// ```
pub const MAX_EVALUATE_DEPTH: u32 = 50;

/// Maximum depth for generic instantiation (substituting type arguments
/// into a type body).
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum number of keys a mapped type expands eagerly.
///
/// Key sets larger than this stay deferred.
pub const MAX_MAPPED_KEYS: usize = 500;

/// Maximum depth for pretty-printing a type. Deeper structure prints as
/// `...`.
pub const MAX_PRINT_DEPTH: u32 = 32;

/// Maximum depth for expression checking.
///
/// ```flow
/// f(f(f(f(f(/* ... hundreds of levels ... */)))));
/// ```
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum number of positional type arguments accepted by
/// `React.AbstractComponent` (`Config`, `Instance`, `Renders`).
pub const MAX_COMPONENT_TYPE_ARGS: usize = 3;
