//! External command execution.
//!
//! Every tool invocation (`git`, `ansible-playbook`, `docker`, `go`, ...)
//! goes through [`run_command`], which blocks until the process exits and
//! maps its exit status to a [`StepResult`]. There are no retries.

mod process;

pub use process::{
    DEFAULT_MAX_CHARS, DEFAULT_MAX_LINES, RunOptions, StepResult, mask_secrets, run_command,
    truncate_output,
};
