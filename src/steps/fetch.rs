//! `fetch`: clone a repository into the workspace.

use super::{command_options, field};
use crate::error::Result;
use crate::pipeline::FetchSpec;
use crate::runner::{StepResult, run_command};
use crate::template::Bindings;
use crate::workflow::StepContext;
use std::path::Path;

pub(super) fn run(
    step: &str,
    spec: &FetchSpec,
    bindings: &Bindings,
    ctx: &mut StepContext<'_>,
) -> Result<StepResult> {
    let url = field(step, "url", &spec.url, bindings)?;
    let branch = field(step, "branch", &spec.branch, bindings)?;
    let dest = field(step, "dest", &spec.dest, bindings)?;
    let ssh_key = match &spec.ssh_key {
        Some(key) => field(step, "ssh_key", key, bindings)?,
        None => String::new(),
    };

    let dest = ctx.scope.resolve(dest.trim());
    let mut options = command_options(ctx);
    if !ssh_key.trim().is_empty() {
        let key = ctx.scope.resolve(ssh_key.trim());
        options
            .env
            .insert("GIT_SSH_COMMAND".to_string(), ssh_command(&key));
    }

    Ok(run_command(
        &clone_command(url.trim(), branch.trim(), &dest),
        &options,
    ))
}

/// `git clone [--branch <b>] --single-branch <url> <dest>`, shell-quoted.
pub(super) fn clone_command(url: &str, branch: &str, dest: &Path) -> String {
    let dest = dest.display().to_string();
    let mut args = vec!["git", "clone"];
    if !branch.is_empty() {
        args.extend(["--branch", branch]);
    }
    args.extend(["--single-branch", url, dest.as_str()]);
    shell_words::join(args)
}

/// SSH command git uses when cloning with a private key.
pub(super) fn ssh_command(key: &Path) -> String {
    format!(
        "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=accept-new",
        shell_words::quote(&key.display().to_string())
    )
}
