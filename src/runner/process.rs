//! Synchronous subprocess runner.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

/// Default maximum number of output lines kept in a failure message.
pub const DEFAULT_MAX_LINES: usize = 50;

/// Default maximum number of output characters kept in a failure message.
pub const DEFAULT_MAX_CHARS: usize = 4096;

/// Outcome of one external step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Exit code 0. Carries the captured stdout.
    Success { output: String },
    /// Non-zero exit, or the process could not be started (`-1`).
    Failure { exit_code: i32, message: String },
}

impl StepResult {
    pub fn success(output: impl Into<String>) -> Self {
        StepResult::Success {
            output: output.into(),
        }
    }

    pub fn failure(exit_code: i32, message: impl Into<String>) -> Self {
        StepResult::Failure {
            exit_code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Success { .. })
    }

    /// Process exit code; `0` for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepResult::Success { .. } => 0,
            StepResult::Failure { exit_code, .. } => *exit_code,
        }
    }
}

/// Options for a single [`run_command`] call.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory (inherits the current one when `None`).
    pub cwd: Option<PathBuf>,
    /// Variables added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Values replaced by `****` in failure messages.
    pub secrets: Vec<String>,
    pub max_lines: usize,
    pub max_chars: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: BTreeMap::new(),
            secrets: Vec::new(),
            max_lines: DEFAULT_MAX_LINES,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl RunOptions {
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_limits(mut self, max_lines: usize, max_chars: usize) -> Self {
        self.max_lines = max_lines;
        self.max_chars = max_chars;
        self
    }
}

/// Run a command line to completion.
///
/// The command is split with shell-words and executed directly (no shell).
/// Exit code 0 maps to `Success`; anything else to `Failure` carrying the
/// exit code and the tail of stderr (or stdout when stderr is empty).
pub fn run_command(command: &str, options: &RunOptions) -> StepResult {
    let shown = mask_secrets(command.trim(), &options.secrets);
    let command = command.trim();
    if command.is_empty() {
        return StepResult::failure(-1, "command is empty");
    }

    let args = match shell_words::split(command) {
        Ok(args) => args,
        Err(e) => {
            return StepResult::failure(
                -1,
                format!(
                    "failed to parse command: {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
                    e, shown
                ),
            );
        }
    };

    let Some((program, cmd_args)) = args.split_first() else {
        return StepResult::failure(
            -1,
            format!("command is empty after parsing.\nCommand: {}", shown),
        );
    };

    let mut cmd = Command::new(program);
    cmd.args(cmd_args).envs(&options.env);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            return StepResult::failure(
                -1,
                format!(
                    "failed to execute command: {}\nCommand: {}\nFix: ensure '{}' is installed and in PATH.",
                    e, shown, program
                ),
            );
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if output.status.success() {
        return StepResult::success(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);
    let captured = if stderr.trim().is_empty() {
        stdout
    } else {
        stderr
    };

    let mut msg = format!(
        "command failed with exit code {}\nCommand: {}\n",
        exit_code, shown
    );
    let truncated = truncate_output(
        &mask_secrets(&captured, &options.secrets),
        options.max_lines,
        options.max_chars,
    );
    if !truncated.is_empty() {
        msg.push_str("\nOutput (truncated):\n");
        msg.push_str(&truncated);
        msg.push('\n');
    }

    StepResult::failure(exit_code, msg)
}

/// Keep the last `max_lines` lines, then at most the last `max_chars` bytes
/// (cut on a char boundary).
pub fn truncate_output(output: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = output.trim_end().lines().collect();

    let relevant_lines = if lines.len() > max_lines {
        &lines[lines.len() - max_lines..]
    } else {
        &lines[..]
    };

    let result = relevant_lines.join("\n");

    if result.len() > max_chars {
        let mut cut = result.len() - max_chars;
        while !result.is_char_boundary(cut) {
            cut += 1;
        }
        return format!("...(truncated)...\n{}", &result[cut..]);
    }

    result
}

/// Replace every non-empty secret value in `text` with `****`.
pub fn mask_secrets(text: &str, secrets: &[String]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), "****"))
}
