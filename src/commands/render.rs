//! Implementation of the `pipewright render` command.

use crate::cli::RenderArgs;
use crate::error::{PipewrightError, Result};
use crate::fs::atomic_write_file;
use crate::params::ParamSource;
use crate::template::{Bindings, render_template};
use std::fs;
use std::path::Path;

/// Render one template file with `--param` bindings.
pub fn cmd_render(args: RenderArgs) -> Result<()> {
    let bindings: Bindings = ParamSource::parse_overrides(&args.params)?
        .into_iter()
        .collect();
    let rendered = render_file(&args.template, &bindings)?;

    match &args.out {
        Some(out) => {
            atomic_write_file(out, &rendered)?;
            println!("Rendered {} -> {}", args.template.display(), out.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render_file(path: &Path, bindings: &Bindings) -> Result<String> {
    let template = fs::read_to_string(path).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to read template '{}': {}",
            path.display(),
            e
        ))
    })?;

    render_template(&template, bindings).map_err(|e| {
        PipewrightError::template(format!("template '{}'", path.display()), e)
    })
}
