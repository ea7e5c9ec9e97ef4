//! Error types for pipewright.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use crate::template::TemplateError;
use thiserror::Error;

/// Main error type for pipewright operations.
///
/// Every variant is fatal to the run; none are retried.
#[derive(Error, Debug)]
pub enum PipewrightError {
    /// Invalid arguments, definition, config, or an I/O failure.
    #[error("{0}")]
    UserError(String),

    /// Required parameters were not supplied.
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    /// A template could not be rendered.
    #[error("template error in {context}: {source}")]
    Template {
        /// What was being rendered (step field, template file, ...).
        context: String,
        #[source]
        source: TemplateError,
    },

    /// An external tool exited non-zero or could not be started.
    #[error("step '{step}' failed with exit code {exit_code}: {message}")]
    ExternalTool {
        step: String,
        exit_code: i32,
        message: String,
    },
}

impl PipewrightError {
    /// Wrap a template error with the thing being rendered.
    pub fn template(context: impl Into<String>, source: TemplateError) -> Self {
        PipewrightError::Template {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipewrightError::UserError(_) => exit_codes::USER_ERROR,
            PipewrightError::MissingParameter(_) => exit_codes::MISSING_PARAMETER,
            PipewrightError::Template { .. } => exit_codes::TEMPLATE_ERROR,
            PipewrightError::ExternalTool { .. } => exit_codes::EXTERNAL_TOOL_FAILURE,
        }
    }
}

/// Result type alias for pipewright operations.
pub type Result<T> = std::result::Result<T, PipewrightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = PipewrightError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(err.to_string(), "bad argument");
    }

    #[test]
    fn missing_parameter_lists_names() {
        let err = PipewrightError::MissingParameter(vec![
            "repo_url".to_string(),
            "branch".to_string(),
        ]);
        assert_eq!(err.exit_code(), exit_codes::MISSING_PARAMETER);
        assert_eq!(
            err.to_string(),
            "missing required parameter(s): repo_url, branch"
        );
    }

    #[test]
    fn template_error_names_context_and_variable() {
        let err = PipewrightError::template(
            "step 'inventory' field 'template'",
            TemplateError::UndefinedVariable {
                name: "missing".to_string(),
                position: 0,
            },
        );
        assert_eq!(err.exit_code(), exit_codes::TEMPLATE_ERROR);
        let msg = err.to_string();
        assert!(msg.contains("step 'inventory'"));
        assert!(msg.contains("undefined variable 'missing'"));
    }

    #[test]
    fn external_tool_error_names_step_and_status() {
        let err = PipewrightError::ExternalTool {
            step: "docker-build".to_string(),
            exit_code: 1,
            message: "no such file".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::EXTERNAL_TOOL_FAILURE);
        assert_eq!(
            err.to_string(),
            "step 'docker-build' failed with exit code 1: no such file"
        );
    }
}
