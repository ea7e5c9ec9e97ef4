//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{PipewrightError, Result};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path` if the file exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            PipewrightError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            PipewrightError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `artifacts_dir` must be non-empty
    /// - `workspace_root`, when set, must be non-empty
    /// - `output_max_lines` and `output_max_chars` must be positive
    pub fn validate(&self) -> Result<()> {
        if self.artifacts_dir.trim().is_empty() {
            return Err(PipewrightError::UserError(
                "config validation failed: artifacts_dir must not be empty".to_string(),
            ));
        }

        if let Some(root) = &self.workspace_root
            && root.trim().is_empty()
        {
            return Err(PipewrightError::UserError(
                "config validation failed: workspace_root must not be empty when set".to_string(),
            ));
        }

        if self.output_max_lines == 0 {
            return Err(PipewrightError::UserError(
                "config validation failed: output_max_lines must be greater than 0".to_string(),
            ));
        }

        if self.output_max_chars == 0 {
            return Err(PipewrightError::UserError(
                "config validation failed: output_max_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
