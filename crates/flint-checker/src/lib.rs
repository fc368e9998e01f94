//! Module checking for flint.
//!
//! This crate drives the solver over a program's statement IR:
//! - `session` - `CheckSession`, the module table and signature caches
//! - `context` - `CheckerOptions` and the per-module `CheckerContext`
//! - `state` - `CheckerState` and the helpers shared by the passes below
//! - `declarations` - hoisting, type definitions, imports and exports
//! - `statements` - statements, branches, loops and function bodies
//! - `expr` - expressions, calls and refinement conditions
//! - `jsx` - JSX elements against component configs
//! - `refinement` - the refinement tracker and captured-write analysis
//! - `mutability` - binding classification and reassignment legality
//! - `error_reporter` - recorded errors to diagnostic trees

pub mod context;
mod declarations;
mod error_reporter;
mod expr;
mod jsx;
pub mod module_cache;
pub mod mutability;
pub mod refinement;
pub mod scope;
pub mod session;
pub mod state;
mod statements;
pub mod walk;

pub use context::{CheckMode, CheckerContext, CheckerOptions, ConfigError};
pub use module_cache::ModuleCache;
pub use mutability::analyze_mutability;
pub use session::{CheckSession, CheckedModule, ImportedModule, ModuleProvider, ModuleSignature, NoModules};
pub use state::CheckerState;
