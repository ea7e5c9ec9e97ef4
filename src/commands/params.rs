//! Implementation of the `pipewright params` command.

use crate::cli::{OutputFormat, ParamsArgs};
use crate::error::{PipewrightError, Result};
use crate::params::ParameterDeclaration;
use crate::pipeline::Pipeline;

/// Print the parameter declaration of a pipeline.
pub fn cmd_params(args: ParamsArgs) -> Result<()> {
    let pipeline = Pipeline::find(&args.pipeline)?;
    let declaration = ParameterDeclaration::new(pipeline.name, pipeline.parameters);
    println!("{}", format_declaration(&declaration, args.format)?);
    Ok(())
}

fn format_declaration(declaration: &ParameterDeclaration, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(declaration.to_table()),
        OutputFormat::Json => serde_json::to_string_pretty(declaration).map_err(|e| {
            PipewrightError::UserError(format!("failed to serialize parameters: {}", e))
        }),
        OutputFormat::Yaml => serde_yaml::to_string(declaration).map_err(|e| {
            PipewrightError::UserError(format!("failed to serialize parameters: {}", e))
        }),
    }
}
