//! `render`: fill a template and write it into the workspace.

use super::field;
use crate::error::{PipewrightError, Result};
use crate::fs::atomic_write_file;
use crate::pipeline::RenderSpec;
use crate::runner::StepResult;
use crate::template::{Bindings, render_template};
use crate::workflow::StepContext;
use std::fs;
use std::path::Path;

pub(super) fn run(
    step: &str,
    spec: &RenderSpec,
    bindings: &Bindings,
    ctx: &mut StepContext<'_>,
    base_dir: Option<&Path>,
) -> Result<StepResult> {
    let dest = field(step, "dest", &spec.dest, bindings)?;

    let (template, context) = match (&spec.template, &spec.template_file) {
        (Some(inline), None) => (
            inline.clone(),
            format!("step '{}' field 'template'", step),
        ),
        (None, Some(file)) => {
            let file = field(step, "template_file", file, bindings)?;
            let path = match base_dir {
                Some(dir) if !Path::new(&file).is_absolute() => dir.join(&file),
                _ => ctx.scope.resolve(&file),
            };
            let content = fs::read_to_string(&path).map_err(|e| {
                PipewrightError::UserError(format!(
                    "step '{}': failed to read template '{}': {}",
                    step,
                    path.display(),
                    e
                ))
            })?;
            (content, format!("step '{}' template '{}'", step, file))
        }
        _ => {
            return Err(PipewrightError::UserError(format!(
                "step '{}' needs exactly one of 'template' or 'template_file'",
                step
            )));
        }
    };

    // Step-local bindings see the run bindings, not each other.
    let mut local = bindings.clone();
    for (key, value) in &spec.bindings {
        let rendered = field(step, &format!("bindings.{}", key), value, bindings)?;
        local.insert(key.clone(), rendered);
    }

    let rendered =
        render_template(&template, &local).map_err(|e| PipewrightError::template(context, e))?;

    let dest = ctx.scope.resolve(dest.trim());
    atomic_write_file(&dest, &rendered)?;

    Ok(StepResult::success(dest.display().to_string()))
}
