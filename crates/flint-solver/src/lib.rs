//! Structural type solver.
//!
//! Types are interned into a [`TypeInterner`] and compared by id. On top of
//! the type graph this crate provides:
//!
//! - **Subtyping**: exact/inexact objects, property variance, functions,
//!   containers, components; co-inductive on recursive types
//! - **Evaluation**: alias expansion, mapped types (eager or deferred),
//!   `$Keys`, indexed access, conditional types, spreads, `$ReadOnly`
//! - **Generics**: arity, defaults, bounds and argument inference
//! - **Narrowing**, the iteration protocol and component modelling
//! - **Lowering** of annotation ASTs and printing of types
//!
//! The solver knows nothing about statements or bindings; named types are
//! reached through the [`TypeResolver`] trait.
pub mod component;
pub mod def;
mod diagnostics;
pub mod errors;
mod evaluate;
pub mod evaluate_rules;
mod format;
pub mod generics;
mod instantiate;
mod intern;
pub mod iterators;
pub mod lower;
mod narrowing;
pub mod objects;
pub mod recursion;
mod subtype;
mod subtype_rules;
pub mod types;
pub mod visitor;

pub use def::*;
pub use diagnostics::SubtypeFailureReason;
pub use errors::{ArityKind, ArityTarget, CheckError, CheckResult, ReassignmentReason};
pub use evaluate::{TypeEvaluator, evaluate_type};
pub use format::{TypePrinter, format_type};
pub use generics::{
    GenericInstantiation, InferenceContext, fill_type_arguments, instantiate_params, widen_literal,
};
pub use instantiate::{TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use iterators::{ITERATOR_METHOD, iterable_of};
pub use lower::{EmptyScope, NamedType, PendingBoundCheck, TypeLowering, TypeScope, lower_annotation};
pub use narrowing::{TypeGuard, TypeofKind};
pub use objects::{PropertyAccess, compose, spread_objects};
pub use subtype::{SubtypeChecker, is_subtype_of};
pub use types::*;

// Test modules not loaded by their source files.
#[cfg(test)]
#[path = "../tests/type_law_tests.rs"]
mod type_law_tests;
#[cfg(test)]
#[path = "../tests/mapped_type_tests.rs"]
mod mapped_type_tests;
