//! Step kinds backed by real processes and files.
//!
//! [`ProcessExecutor`] renders each step's fields against the run bindings
//! (parameters plus `workspace`, `artifacts_dir` and `run_id`) and then:
//!
//! - `fetch`: clones with `git`
//! - `render`: writes a rendered template into the workspace
//! - `exec`: runs a command
//! - `container`: starts a detached `docker` container, removed on release
//! - `collect`: copies matching files into the staging area

mod collect;
mod container;
mod exec;
mod fetch;
mod render;


use crate::error::{PipewrightError, Result};
use crate::pipeline::{Step, StepKind};
use crate::runner::{RunOptions, StepResult};
use crate::template::{Bindings, render_template};
use crate::workflow::{StepContext, StepExecutor};
use std::path::PathBuf;

pub use container::CONTAINER_TOOL;

/// Environment variables exported to every command a step runs.
pub const ENV_RUN_ID: &str = "PIPEWRIGHT_RUN_ID";
pub const ENV_WORKSPACE: &str = "PIPEWRIGHT_WORKSPACE";
pub const ENV_ARTIFACTS_DIR: &str = "PIPEWRIGHT_ARTIFACTS_DIR";

/// Executes steps by spawning the external tools they name.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    /// Directory `template_file` paths resolve against; the workspace when `None`.
    base_dir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }
}

impl StepExecutor for ProcessExecutor {
    fn execute(&mut self, step: &Step, ctx: &mut StepContext<'_>) -> Result<StepResult> {
        let mut bindings = ctx.params.bindings();
        bindings.extend(ctx.scope.builtin_bindings());

        let name = step.name.as_str();
        match &step.kind {
            StepKind::Fetch(spec) => fetch::run(name, spec, &bindings, ctx),
            StepKind::Render(spec) => {
                render::run(name, spec, &bindings, ctx, self.base_dir.as_deref())
            }
            StepKind::Exec(spec) => exec::run(name, spec, &bindings, ctx),
            StepKind::Container(spec) => container::run(name, spec, &bindings, ctx),
            StepKind::Collect(spec) => collect::run(name, spec, &bindings, ctx),
        }
    }
}

/// Render one step field, naming the step and field on failure.
fn field(step: &str, name: &str, template: &str, bindings: &Bindings) -> Result<String> {
    render_template(template, bindings).map_err(|e| {
        PipewrightError::template(format!("step '{}' field '{}'", step, name), e)
    })
}

/// Command options for a step: workspace cwd, output limits, secrets to mask,
/// and the parameters plus run paths exported as environment variables.
fn command_options(ctx: &StepContext<'_>) -> RunOptions {
    let mut options = ctx.scope.run_options();
    options.secrets = ctx.params.secrets().to_vec();
    for (name, value) in ctx.params.iter() {
        options.env.insert(name.to_string(), value.to_string());
    }
    options
        .env
        .insert(ENV_RUN_ID.to_string(), ctx.scope.run_id().to_string());
    options.env.insert(
        ENV_WORKSPACE.to_string(),
        ctx.scope.workspace().display().to_string(),
    );
    options.env.insert(
        ENV_ARTIFACTS_DIR.to_string(),
        ctx.scope.staging_dir().display().to_string(),
    );
    options
}
