//! Exit code constants for the pipewright CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid definition or config, I/O)
//! - 2: Missing parameter (parameter set declared, run halted)
//! - 3: Template error (unresolved or malformed placeholder)
//! - 4: External tool failure (non-zero exit from a step)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid pipeline definition, config or I/O failure.
pub const USER_ERROR: i32 = 1;

/// Required parameters were absent; the parameter declaration was printed instead.
pub const MISSING_PARAMETER: i32 = 2;

/// A template referenced an unbound placeholder or was malformed.
pub const TEMPLATE_ERROR: i32 = 3;

/// An external tool exited non-zero (or could not be started).
pub const EXTERNAL_TOOL_FAILURE: i32 = 4;
