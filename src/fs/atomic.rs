//! Atomic file writes.
//!
//! Content is written to a temporary file in the target's directory, synced,
//! and then renamed over the target. A reader never sees a partially
//! rendered inventory or Dockerfile. Source and destination share a
//! directory, so the rename stays on one filesystem.

use crate::error::{PipewrightError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write bytes to a file, creating parent directories.
///
/// # Example
///
/// ```no_run
/// use pipewright::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("inventory.ini"), b"[agents]\n10.0.0.1\n")?;
/// # Ok::<(), pipewright::error::PipewrightError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to create temporary file in '{}': {}",
            parent.display(),
            e
        ))
    })?;

    temp.write_all(content).map_err(|e| {
        PipewrightError::UserError(format!("failed to write to temporary file: {}", e))
    })?;

    temp.as_file().sync_all().map_err(|e| {
        PipewrightError::UserError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    // The temp file is removed on drop if persisting fails
    temp.persist(path).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e.error
        ))
    })?;

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}
