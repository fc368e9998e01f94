//! The `check` command: load a program and its options, check every
//! module, and collect the result as a serializable report.

use crate::cli::args::{CheckArgs, TypePosition};
use anyhow::{Context, Result, bail};
use flint_ast::Program;
use flint_checker::{CheckSession, CheckerOptions};
use flint_common::Diagnostic;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Output of `flint check`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_at: Option<TypeAtReport>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Answer to a `--type-at` query. `type` is absent when nothing typed
/// covers the offset.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAtReport {
    pub file: String,
    pub offset: u32,
    #[serde(rename = "type")]
    pub ty: Option<String>,
}

pub fn load_program(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read program {}", path.display()))?;
    let program: Program = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse program {}", path.display()))?;
    debug!(modules = program.modules.len(), "loaded program");
    Ok(program)
}

/// Options from `--config` (or the defaults), with `--mode` applied on top.
pub fn load_options(args: &CheckArgs) -> Result<CheckerOptions> {
    let options = match &args.config {
        Some(path) => CheckerOptions::load(path)
            .with_context(|| format!("failed to load checker options from {}", path.display()))?,
        None => CheckerOptions::default(),
    };
    Ok(match args.mode {
        Some(mode) => options.with_mode(mode.to_check_mode()),
        None => options,
    })
}

pub fn check_program(
    program: Program,
    options: CheckerOptions,
    type_at: Option<&TypePosition>,
) -> Result<CheckReport> {
    if let Some(position) = type_at {
        if !program.modules.iter().any(|m| m.name == position.file) {
            bail!("--type-at names unknown module `{}`", position.file);
        }
    }

    let session = CheckSession::new(program, options);
    let diagnostics = session.diagnostics();
    let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
    let warning_count = diagnostics.len() - error_count;
    info!(errors = error_count, warnings = warning_count, "check finished");

    let type_at = type_at.map(|position| TypeAtReport {
        file: position.file.clone(),
        offset: position.offset,
        ty: session.type_at_pos(&position.file, position.offset),
    });

    Ok(CheckReport {
        diagnostics,
        error_count,
        warning_count,
        type_at,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckReport> {
    let program = load_program(&args.program)?;
    let options = load_options(args)?;
    check_program(program, options, args.type_at.as_ref())
}
