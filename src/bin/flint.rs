use anyhow::{Context, Result};
use clap::Parser;

use flint::cli::{CliArgs, Command};

/// Exit status when the checked program has errors.
const EXIT_ERRORS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if FLINT_LOG or RUST_LOG is set.
    flint::tracing_config::init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Check(check) => {
            let report = flint::cli::run_check(&check)?;
            let json = if check.pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .context("failed to serialize diagnostics")?;
            println!("{json}");
            if report.has_errors() {
                std::process::exit(EXIT_ERRORS);
            }
        }
    }
    Ok(())
}
