//! flint: a structural, gradually typed checker for annotated JavaScript.
//!
//! The work is split across the workspace crates, re-exported here:
//!
//! - [`common`]: spans, atoms, limits and the diagnostic model
//! - [`ast`]: the annotation AST and statement IR a parser hands over
//! - [`solver`]: the type arena, subtyping, evaluation and generics
//! - [`checker`]: statements, refinement, modules and JSX
//!
//! The `flint` binary reads a JSON-serialized [`Program`] and prints its
//! diagnostics; [`cli`] holds the argument parsing and the driver behind it.

pub use flint_ast as ast;
pub use flint_checker as checker;
pub use flint_common as common;
pub use flint_solver as solver;

pub mod cli;
pub mod tracing_config;

pub use flint_ast::{Module, Program};
pub use flint_checker::{CheckMode, CheckSession, CheckedModule, CheckerOptions};
pub use flint_common::Diagnostic;
