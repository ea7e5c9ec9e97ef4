//! Default value functions used by the Config struct.

use crate::runner::{DEFAULT_MAX_CHARS, DEFAULT_MAX_LINES};

/// Config file name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub(crate) fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}
pub(crate) fn default_output_max_lines() -> usize {
    DEFAULT_MAX_LINES
}
pub(crate) fn default_output_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}
pub(crate) fn default_true() -> bool {
    true
}
