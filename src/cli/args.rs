use clap::{Args, Parser, Subcommand, ValueEnum};
use flint_checker::CheckMode;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the flint binary.
#[derive(Parser, Debug)]
#[command(
    name = "flint",
    version,
    about = "Structural, gradually typed checker for annotated JavaScript"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a JSON-serialized program and print its diagnostics as JSON.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the program: `{"modules": [...]}` of statement IR.
    pub program: PathBuf,

    /// Checker options file (camelCase JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the checking mode from the options file.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Also report the type at a position, given as `module:offset`.
    #[arg(long = "type-at", value_name = "FILE:OFFSET")]
    pub type_at: Option<TypePosition>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    #[value(alias = "singleModule")]
    SingleModule,
    #[value(alias = "wholeProgram")]
    WholeProgram,
}

impl Mode {
    pub fn to_check_mode(self) -> CheckMode {
        match self {
            Mode::SingleModule => CheckMode::SingleModule,
            Mode::WholeProgram => CheckMode::WholeProgram,
        }
    }
}

/// A `module:offset` position. The offset is split at the last colon, so
/// module names may themselves contain colons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypePosition {
    pub file: String,
    pub offset: u32,
}

impl FromStr for TypePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, offset) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected FILE:OFFSET, got `{s}`"))?;
        if file.is_empty() {
            return Err(format!("missing module name in `{s}`"));
        }
        let offset = offset
            .parse()
            .map_err(|_| format!("invalid offset `{offset}` in `{s}`"))?;
        Ok(Self {
            file: file.to_string(),
            offset,
        })
    }
}
