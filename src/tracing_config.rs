//! Tracing configuration for debugging checker behavior.
//!
//! Supports three output formats controlled by `FLINT_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`
//! - `json`: one JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Nested subtype checks and evaluations as a tree
//! FLINT_LOG=debug FLINT_LOG_FORMAT=tree flint check program.json
//!
//! # JSON, for tooling
//! FLINT_LOG=debug FLINT_LOG_FORMAT=json flint check program.json
//!
//! # Fine-grained filtering
//! FLINT_LOG="flint_checker=debug,flint_solver=trace" flint check program.json
//! ```
//!
//! The subscriber is only initialised when `FLINT_LOG` (or `RUST_LOG`) is
//! set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `FLINT_LOG_FORMAT` value; anything unrecognised is `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("FLINT_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `FLINT_LOG`, falling back to `RUST_LOG`.
///
/// `FLINT_LOG` takes precedence when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("FLINT_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `FLINT_LOG` nor `RUST_LOG` is set. All output
/// goes to stderr; stdout carries the diagnostics JSON.
pub fn init_tracing() {
    let has_flint_log = std::env::var("FLINT_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_flint_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
    }
}
