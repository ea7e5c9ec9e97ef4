//! Command implementations for pipewright.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod check;
mod list;
mod params;
mod render;
mod run;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::List => list::cmd_list(),
        Command::Params(args) => params::cmd_params(args),
        Command::Check(args) => check::cmd_check(args),
        Command::Render(args) => render::cmd_render(args),
        Command::Run(args) => run::cmd_run(args),
    }
}
