//! Annotation AST and statement IR.
//!
//! Parsing is done outside of flint. A parser (or a test) hands the checker a
//! [`Program`]: one [`Module`] per compilation unit, each a list of
//! statements whose type annotations are [`TypeNode`] trees. Every node carries
//! a byte [`Span`](flint_common::Span) into the module's source text; spans drive
//! diagnostics and type-at-position queries.
//!
//! All node types deserialize from JSON (`"type"`-tagged, camelCase), which is
//! the format the `flint` binary reads.

pub mod build;
pub mod stmt;
pub mod types;

pub use stmt::*;
pub use types::*;

#[cfg(test)]
#[path = "../tests/ast_tests.rs"]
mod tests;
