use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A git repository on `main` with one commit holding `files`, plus a
/// `release` branch that adds `RELEASE.txt`.
pub(crate) fn create_source_repo(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    for (name, content) in files {
        let file = path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file, content).unwrap();
    }
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    git(path, &["checkout", "-b", "release"]);
    std::fs::write(path.join("RELEASE.txt"), "release\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Release commit"]);
    git(path, &["checkout", "main"]);

    temp_dir
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}
