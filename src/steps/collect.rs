//! `collect`: copy matching workspace files into the staging area.

use super::field;
use crate::error::{PipewrightError, Result};
use crate::fs::copy_file;
use crate::pipeline::CollectSpec;
use crate::runner::StepResult;
use crate::template::Bindings;
use crate::workflow::StepContext;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::Path;

pub(super) fn run(
    step: &str,
    spec: &CollectSpec,
    bindings: &Bindings,
    ctx: &mut StepContext<'_>,
) -> Result<StepResult> {
    let patterns = spec
        .patterns
        .iter()
        .map(|pattern| field(step, "patterns", pattern, bindings))
        .collect::<Result<Vec<_>>>()?;
    let root = match &spec.from {
        Some(from) => ctx.scope.resolve(field(step, "from", from, bindings)?.trim()),
        None => ctx.scope.workspace().to_path_buf(),
    };

    if !root.is_dir() {
        return Ok(StepResult::failure(
            1,
            format!("collect source '{}' is not a directory", root.display()),
        ));
    }

    let globs = build_globset(&patterns).map_err(|e| {
        PipewrightError::UserError(format!(
            "step '{}' has an invalid pattern: {}\n\nFix: check the glob syntax in 'patterns'.",
            step, e
        ))
    })?;

    let mut files = Vec::new();
    walk(&root, &root, &globs, &mut files)?;
    files.sort();

    if files.is_empty() {
        if spec.allow_empty {
            return Ok(StepResult::success(""));
        }
        return Ok(StepResult::failure(
            1,
            format!(
                "no files matched {} under '{}'",
                patterns.join(", "),
                root.display()
            ),
        ));
    }

    let staging = ctx.scope.staging_dir().to_path_buf();
    for relative in &files {
        copy_file(root.join(relative), staging.join(relative))?;
    }

    Ok(StepResult::success(files.join("\n")))
}

/// Patterns are matched against forward-slash paths relative to the root.
fn build_globset(patterns: &[String]) -> std::result::Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let normalized = pattern.trim().replace('\\', "/");
        if normalized.is_empty() {
            continue;
        }
        builder.add(Glob::new(&normalized)?);
    }

    builder.build()
}

/// Collect files under `dir` matching `globs`, skipping `.git`.
fn walk(root: &Path, dir: &Path, globs: &GlobSet, out: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to read directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to read directory entry in '{}': {}",
                dir.display(),
                e
            ))
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to stat '{}': {}",
                path.display(),
                e
            ))
        })?;

        if file_type.is_dir() {
            if entry.file_name() != ".git" {
                walk(root, &path, globs, out)?;
            }
        } else if file_type.is_file()
            && let Ok(relative) = path.strip_prefix(root)
        {
            let relative = relative.to_string_lossy().replace('\\', "/");
            if globs.is_match(&relative) {
                out.push(relative);
            }
        }
    }

    Ok(())
}
