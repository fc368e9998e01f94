//! Common types and utilities for the flint type checker.
//!
//! This crate provides foundational types used across all flint crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans and line maps (`Span`, `SourceSpan`, `LineMap`)
//! - Checker limits and thresholds
//! - The diagnostic tree handed to downstream renderers

// String interning for identifiers, property names and string literals
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{LineMap, SourceSpan, Span};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic tree and message catalogue
pub mod diagnostics;
pub use diagnostics::{Diagnostic, ExtraInfo, MessagePart, MessageReference, Severity};
