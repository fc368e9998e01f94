//! Command-line front end: argument parsing and the check driver.

pub mod args;
pub mod driver;

pub use args::{CliArgs, Command, CheckArgs, Mode, TypePosition};
pub use driver::{CheckReport, TypeAtReport, check_program, load_options, load_program, run_check};
