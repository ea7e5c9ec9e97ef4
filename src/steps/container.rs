//! `container`: start a detached container for the rest of the run.

use super::{command_options, field};
use crate::error::Result;
use crate::pipeline::ContainerSpec;
use crate::runner::{StepResult, run_command};
use crate::template::Bindings;
use crate::workflow::StepContext;
use std::collections::BTreeMap;

/// Container CLI used for `run` and `rm`.
pub const CONTAINER_TOOL: &str = "docker";

pub(super) fn run(
    step: &str,
    spec: &ContainerSpec,
    bindings: &Bindings,
    ctx: &mut StepContext<'_>,
) -> Result<StepResult> {
    let image = field(step, "image", &spec.image, bindings)?;
    let name = field(step, "name", &spec.name, bindings)?;
    let ports = spec
        .ports
        .iter()
        .map(|port| field(step, "ports", port, bindings))
        .collect::<Result<Vec<_>>>()?;
    let args = spec
        .args
        .iter()
        .map(|arg| field(step, "args", arg, bindings))
        .collect::<Result<Vec<_>>>()?;
    let mut env = BTreeMap::new();
    for (key, value) in &spec.env {
        env.insert(
            key.clone(),
            field(step, &format!("env.{}", key), value, bindings)?,
        );
    }
    let verify = match &spec.verify {
        Some(verify) => Some(field(step, "verify", verify, bindings)?),
        None => None,
    };

    // Registered before starting: a container created by a failed `run` is
    // still removed.
    ctx.scope
        .register_cleanup(format!("container {}", name), remove_command(&name));

    let options = command_options(ctx);
    let started = run_command(&run_command_line(&image, &name, &ports, &env, &args), &options);
    if !started.is_success() {
        return Ok(started);
    }

    match verify {
        Some(verify) if !verify.trim().is_empty() => Ok(run_command(&verify, &options)),
        _ => Ok(started),
    }
}

/// `docker run -d --name <name> [-p ..] [-e K=V ..] <image> [args ..]`.
pub(super) fn run_command_line(
    image: &str,
    name: &str,
    ports: &[String],
    env: &BTreeMap<String, String>,
    args: &[String],
) -> String {
    let mut words: Vec<String> = vec![
        CONTAINER_TOOL.to_string(),
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        name.to_string(),
    ];
    for port in ports {
        words.push("-p".to_string());
        words.push(port.clone());
    }
    for (key, value) in env {
        words.push("-e".to_string());
        words.push(format!("{}={}", key, value));
    }
    words.push(image.to_string());
    words.extend(args.iter().cloned());
    shell_words::join(words)
}

/// `docker rm -f <name>`.
pub(super) fn remove_command(name: &str) -> String {
    shell_words::join([CONTAINER_TOOL, "rm", "-f", name])
}
