//! Resources held by one run.
//!
//! A [`RunScope`] owns the scratch workspace, the artifact staging area and
//! every cleanup command registered by steps (e.g. `docker rm -f <name>` for
//! a started container). Release happens exactly once: either explicitly via
//! [`RunScope::release`] or, if the scope is dropped first, from `Drop`.

use crate::error::{PipewrightError, Result};
use crate::fs::move_tree;
use crate::pipeline::{VAR_ARTIFACTS_DIR, VAR_RUN_ID, VAR_WORKSPACE};
use crate::runner::{RunOptions, StepResult, run_command};
use crate::template::Bindings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Subdirectory of the scope root holding the workspace.
const WORK_DIR_NAME: &str = "work";

/// Subdirectory of the scope root holding collected artifacts.
const STAGING_DIR_NAME: &str = "artifacts";

/// How to lay out a run's scratch space.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    /// Parent for temporary workspaces (system temp dir when `None`).
    pub workspace_root: Option<PathBuf>,

    /// When set, the workspace is created at `<keep_in>/<run_id>` and left in
    /// place on release.
    pub keep_in: Option<PathBuf>,

    /// Base options for commands run inside the scope (limits, secrets).
    pub run: RunOptions,
}

/// Outcome of one release action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRecord {
    pub label: String,
    pub result: StepResult,
}

#[derive(Debug)]
enum Root {
    Temp(TempDir),
    Kept(PathBuf),
}

#[derive(Debug)]
struct Cleanup {
    label: String,
    command: String,
}

/// Scratch workspace, staging area and registered cleanups for one run.
#[derive(Debug)]
pub struct RunScope {
    run_id: String,
    root: Option<Root>,
    workspace: PathBuf,
    staging: PathBuf,
    run: RunOptions,
    cleanups: Vec<Cleanup>,
    released: bool,
}

impl RunScope {
    /// Create the workspace and staging directories for `run_id`.
    pub fn acquire(run_id: impl Into<String>, options: ScopeOptions) -> Result<Self> {
        let run_id = run_id.into();

        let root = match &options.keep_in {
            Some(parent) => {
                let dir = parent.join(&run_id);
                if dir.exists() {
                    return Err(PipewrightError::UserError(format!(
                        "workspace '{}' already exists\n\nFix: remove it or use a different run.",
                        dir.display()
                    )));
                }
                Root::Kept(dir)
            }
            None => {
                let mut builder = tempfile::Builder::new();
                builder.prefix("pipewright-");
                let temp = match &options.workspace_root {
                    Some(parent) => {
                        create_dir(parent)?;
                        builder.tempdir_in(parent)
                    }
                    None => builder.tempdir(),
                }
                .map_err(|e| {
                    PipewrightError::UserError(format!(
                        "failed to create temporary workspace: {}",
                        e
                    ))
                })?;
                Root::Temp(temp)
            }
        };

        let base = match &root {
            Root::Temp(temp) => temp.path().to_path_buf(),
            Root::Kept(dir) => dir.clone(),
        };
        let workspace = base.join(WORK_DIR_NAME);
        let staging = base.join(STAGING_DIR_NAME);
        create_dir(&workspace)?;
        create_dir(&staging)?;

        let mut run = options.run;
        run.cwd = Some(workspace.clone());

        Ok(Self {
            run_id,
            root: Some(root),
            workspace,
            staging,
            run,
            cleanups: Vec::new(),
            released: false,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Directory steps run in.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Directory `collect` steps copy into; published only on success.
    pub fn staging_dir(&self) -> &Path {
        &self.staging
    }

    /// Whether the workspace survives release.
    pub fn is_kept(&self) -> bool {
        matches!(self.root, Some(Root::Kept(_)))
    }

    /// `workspace`, `artifacts_dir` and `run_id` as template bindings.
    pub fn builtin_bindings(&self) -> Bindings {
        Bindings::from([
            (
                VAR_WORKSPACE.to_string(),
                self.workspace.display().to_string(),
            ),
            (
                VAR_ARTIFACTS_DIR.to_string(),
                self.staging.display().to_string(),
            ),
            (VAR_RUN_ID.to_string(), self.run_id.clone()),
        ])
    }

    /// Resolve a path against the workspace; absolute paths pass through.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Command options rooted in the workspace.
    pub fn run_options(&self) -> RunOptions {
        self.run.clone()
    }

    /// Register a command to run on release. Cleanups run in reverse order.
    pub fn register_cleanup(&mut self, label: impl Into<String>, command: impl Into<String>) {
        self.cleanups.push(Cleanup {
            label: label.into(),
            command: command.into(),
        });
    }

    /// Move the staging area to `<dest_root>/<run_id>`.
    ///
    /// Returns `None` when nothing was collected.
    pub fn publish(&self, dest_root: &Path) -> Result<Option<PathBuf>> {
        let has_entries = fs::read_dir(&self.staging)
            .map_err(|e| {
                PipewrightError::UserError(format!(
                    "failed to read staging directory '{}': {}",
                    self.staging.display(),
                    e
                ))
            })?
            .next()
            .is_some();

        if !has_entries {
            return Ok(None);
        }

        let destination = dest_root.join(&self.run_id);
        move_tree(&self.staging, &destination)?;
        Ok(Some(destination))
    }

    /// Run registered cleanups (last registered first), then remove a
    /// temporary workspace. Later calls do nothing.
    pub fn release(&mut self) -> Vec<CleanupRecord> {
        if self.released {
            return Vec::new();
        }
        self.released = true;

        let mut records = Vec::new();
        let mut options = self.run.clone();
        options.cwd = None;

        while let Some(cleanup) = self.cleanups.pop() {
            let result = run_command(&cleanup.command, &options);
            records.push(CleanupRecord {
                label: cleanup.label,
                result,
            });
        }

        if let Some(Root::Temp(temp)) = self.root.take() {
            let path = temp.path().display().to_string();
            let result = match temp.close() {
                Ok(()) => StepResult::success(""),
                Err(e) => StepResult::failure(
                    -1,
                    format!("failed to remove workspace '{}': {}", path, e),
                ),
            };
            records.push(CleanupRecord {
                label: "workspace".to_string(),
                result,
            });
        }

        records
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        for record in self.release() {
            if let StepResult::Failure { message, .. } = &record.result {
                eprintln!("Warning: cleanup '{}' failed: {}", record.label, message);
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}
