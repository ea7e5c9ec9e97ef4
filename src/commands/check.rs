//! Implementation of the `pipewright check` command.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Load and validate a pipeline, then print its outline.
///
/// Loading already runs every static check; anything printed here passed.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let pipeline = Pipeline::find(&args.pipeline)?;
    print!("{}", outline(&pipeline)?);
    Ok(())
}

fn outline(pipeline: &Pipeline) -> Result<String> {
    let mut out = format!(
        "Pipeline '{}' is valid: {} parameter(s), {} step(s)\n",
        pipeline.name,
        pipeline.parameters.len(),
        pipeline.steps.len()
    );
    for (i, step) in pipeline.steps.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} [{}] {}\n",
            i + 1,
            step.name,
            step.kind,
            step.kind.summary()
        ));
        let variables = step.variables()?;
        if !variables.is_empty() {
            out.push_str(&format!("     uses: {}\n", variables.join(", ")));
        }
    }
    Ok(out)
}
