//! Pipewright: parameterized template-render-and-execute pipelines.
//!
//! This is the main entry point for the `pipewright` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and handles
//! errors with proper exit codes.

use pipewright::cli::Cli;
use pipewright::{commands, exit_codes};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
