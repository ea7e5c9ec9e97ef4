//! `exec`: run a command in the workspace.

use super::{command_options, field};
use crate::error::Result;
use crate::pipeline::ExecSpec;
use crate::runner::{StepResult, run_command};
use crate::template::Bindings;
use crate::workflow::StepContext;

pub(super) fn run(
    step: &str,
    spec: &ExecSpec,
    bindings: &Bindings,
    ctx: &mut StepContext<'_>,
) -> Result<StepResult> {
    let command = field(step, "command", &spec.command, bindings)?;

    let mut options = command_options(ctx);
    if let Some(cwd) = &spec.cwd {
        let cwd = field(step, "cwd", cwd, bindings)?;
        options.cwd = Some(ctx.scope.resolve(cwd.trim()));
    }
    for (key, value) in &spec.env {
        let value = field(step, &format!("env.{}", key), value, bindings)?;
        options.env.insert(key.clone(), value);
    }
    let cleanup = match &spec.cleanup {
        Some(cleanup) => Some(field(step, "cleanup", cleanup, bindings)?),
        None => None,
    };

    let result = run_command(&command, &options);
    if let Some(cleanup) = cleanup
        && result.is_success()
        && !cleanup.trim().is_empty()
    {
        ctx.scope.register_cleanup(format!("step {}", step), cleanup);
    }
    Ok(result)
}
