//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Settings for running pipelines.
///
/// This struct represents the contents of `.pipewright/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Directories
    // =========================================================================
    /// Where successful runs publish their collected files, relative to the
    /// working directory (each run gets `<artifacts_dir>/<run_id>/`).
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Parent directory for per-run scratch workspaces (system temp if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<String>,

    /// Keep the scratch workspace after the run instead of deleting it.
    /// Kept workspaces live under `.pipewright/workspaces/<run_id>/`.
    #[serde(default)]
    pub keep_workspace: bool,

    // =========================================================================
    // Output
    // =========================================================================
    /// Maximum lines of tool output quoted in a failure message.
    #[serde(default = "default_output_max_lines")]
    pub output_max_lines: usize,

    /// Maximum characters of tool output quoted in a failure message.
    #[serde(default = "default_output_max_chars")]
    pub output_max_chars: usize,

    /// Whether to append run events to `.pipewright/events/events.ndjson`.
    #[serde(default = "default_true")]
    pub log_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            workspace_root: None,
            keep_workspace: false,
            output_max_lines: default_output_max_lines(),
            output_max_chars: default_output_max_chars(),
            log_events: default_true(),
        }
    }
}
