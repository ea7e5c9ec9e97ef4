//! Working-directory context resolution for pipewright.
//!
//! A run is anchored in a working directory (the current directory unless
//! `--workdir` is given). Tool state lives under `<workdir>/.pipewright/`:
//!
//! ```text
//! .pipewright/
//!   config.yaml          optional settings
//!   events/events.ndjson append-only run log
//!   workspaces/<run_id>/ scratch workspaces kept with keep_workspace
//! ```

use crate::config::Config;
use crate::config::types::CONFIG_FILE_NAME;
use crate::error::{PipewrightError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// State directory name inside the working directory.
pub const STATE_DIR_NAME: &str = ".pipewright";

/// Resolved paths for one invocation. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Directory the tool was pointed at.
    pub work_dir: PathBuf,

    /// `{work_dir}/.pipewright`.
    pub state_dir: PathBuf,
}

impl RunContext {
    /// Resolve from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            PipewrightError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve from a specific directory, which must exist.
    pub fn resolve_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let work_dir = dir.canonicalize().map_err(|e| {
            PipewrightError::UserError(format!(
                "working directory '{}' is not accessible: {}",
                dir.display(),
                e
            ))
        })?;

        if !work_dir.is_dir() {
            return Err(PipewrightError::UserError(format!(
                "working directory '{}' is not a directory",
                work_dir.display()
            )));
        }

        let state_dir = work_dir.join(STATE_DIR_NAME);
        Ok(Self {
            work_dir,
            state_dir,
        })
    }

    /// Path of the settings file.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE_NAME)
    }

    /// Directory holding the run log.
    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    /// Parent of kept scratch workspaces.
    pub fn workspaces_dir(&self) -> PathBuf {
        self.state_dir.join("workspaces")
    }

    /// Parent of published run artifacts.
    pub fn artifacts_root(&self, config: &Config) -> PathBuf {
        self.resolve_path(&config.artifacts_dir)
    }

    /// Resolve a possibly-relative path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}
