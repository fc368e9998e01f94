//! Checker options and the per-module checking context.

use crate::session::ModuleProvider;
use flint_common::Atom;
use flint_common::limits::{MAX_EVALUATE_DEPTH, MAX_SUBTYPE_DEPTH};
use flint_solver::{DefinitionStore, ModuleView, TypeInterner};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How much of other modules is visible while checking one module.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckMode {
    /// Imports see the inferred exports of the imported module; only declared
    /// immutability is enforced on reassignment.
    #[default]
    SingleModule,
    /// Imports see declared export signatures only, and exported bindings
    /// may not be reassigned.
    WholeProgram,
}

/// User-tunable checker settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerOptions {
    pub mode: CheckMode,
    pub max_subtype_depth: u32,
    pub max_evaluate_depth: u32,
    /// Report statements after `return`/`throw` and branches refinement
    /// proves impossible.
    pub report_unreachable: bool,
    /// Report writes to read-only (`+`) properties.
    pub strict_read_only: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            mode: CheckMode::SingleModule,
            max_subtype_depth: MAX_SUBTYPE_DEPTH,
            max_evaluate_depth: MAX_EVALUATE_DEPTH,
            report_unreachable: true,
            strict_read_only: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid checker configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid checker configuration: {0} must be at least 1")]
    ZeroLimit(&'static str),
}

impl CheckerOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_subtype_depth == 0 {
            return Err(ConfigError::ZeroLimit("maxSubtypeDepth"));
        }
        if self.max_evaluate_depth == 0 {
            return Err(ConfigError::ZeroLimit("maxEvaluateDepth"));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn whole_program(&self) -> bool {
        matches!(self.mode, CheckMode::WholeProgram)
    }
}

/// Shared, read-only state for checking one module.
pub struct CheckerContext<'a> {
    pub interner: &'a TypeInterner,
    pub defs: &'a DefinitionStore,
    pub options: &'a CheckerOptions,
    pub provider: &'a dyn ModuleProvider,
    /// Interned module name; opaque types declared under it are transparent.
    pub module: Atom,
    pub file: &'a str,
}

impl<'a> CheckerContext<'a> {
    pub fn view(&self) -> ModuleView<'a> {
        ModuleView::new(self.defs, self.module)
    }
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
