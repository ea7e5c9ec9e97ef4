//! Copy and move helpers for collected files.
//!
//! Scratch workspaces usually live in the system temp directory while
//! published artifacts live under the working directory, so a plain
//! `rename(2)` can fail with `EXDEV` ("Invalid cross-device link"). In that
//! case the tree is copied and the source removed.

use crate::error::{PipewrightError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Copy one file, creating the destination's parent directories.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to create destination directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    fs::copy(source, destination).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to copy '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ))
    })?;

    Ok(())
}

/// Move a directory tree (or a single file) to `destination`.
///
/// - Tries `rename()` first.
/// - Falls back to a recursive copy + delete of `source` on EXDEV.
///
/// `destination` must not exist yet.
pub fn move_tree<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if destination.exists() {
        return Err(PipewrightError::UserError(format!(
            "refusing to overwrite existing path '{}'",
            destination.display()
        )));
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to create destination directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_rename(&e) => {
            copy_tree(source, destination)?;
            remove_tree(source)
        }
        Err(e) => Err(PipewrightError::UserError(format!(
            "failed to move '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ))),
    }
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    if source.is_file() {
        return copy_file(source, destination);
    }

    fs::create_dir_all(destination).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to create directory '{}': {}",
            destination.display(),
            e
        ))
    })?;

    let entries = fs::read_dir(source).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to read directory '{}': {}",
            source.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to read directory entry in '{}': {}",
                source.display(),
                e
            ))
        })?;
        copy_tree(&entry.path(), &destination.join(entry.file_name()))?;
    }

    Ok(())
}

fn remove_tree(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| {
        PipewrightError::UserError(format!(
            "moved '{}' but failed to remove the source: {}",
            path.display(),
            e
        ))
    })
}

fn is_cross_device_rename(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }

    #[cfg(unix)]
    {
        // EXDEV is 18 on Linux and macOS
        error.raw_os_error() == Some(18)
    }

    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("app");
        fs::write(&src, "binary").unwrap();

        let dst = temp.path().join("dist/bin/app");
        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "binary");
        assert!(src.exists());
    }

    #[test]
    fn test_move_tree_moves_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("staging");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/report.xml"), "<ok/>").unwrap();

        let dst = temp.path().join("artifacts/run-1");
        move_tree(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(
            fs::read_to_string(dst.join("nested/report.xml")).unwrap(),
            "<ok/>"
        );
    }

    #[test]
    fn test_move_tree_refuses_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a");
        let dst = temp.path().join("b");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();

        let err = move_tree(&src, &dst).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
        assert!(src.exists());
    }

    #[test]
    fn test_copy_tree_copies_nested_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("x/y")).unwrap();
        fs::write(src.join("x/y/z.txt"), "deep").unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();

        let dst = temp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("x/y/z.txt")).unwrap(), "deep");
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
    }
}
