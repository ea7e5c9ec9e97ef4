//! Implementation of the `pipewright list` command.

use crate::error::Result;
use crate::pipeline::{builtin, builtin_names};

/// Print each built-in pipeline with its description.
pub fn cmd_list() -> Result<()> {
    print!("{}", format_builtins()?);
    Ok(())
}

fn format_builtins() -> Result<String> {
    let names = builtin_names();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    let mut out = String::from("Built-in pipelines:\n\n");
    for name in names {
        let Some(pipeline) = builtin(name) else {
            continue;
        };
        let pipeline = pipeline?;
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            pipeline.name,
            pipeline.description,
            width = width
        ));
    }
    out.push_str("\nRun `pipewright params <name>` to see what a pipeline accepts.\n");
    Ok(out)
}
