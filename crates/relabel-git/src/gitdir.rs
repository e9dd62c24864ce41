//! Repository discovery.

use crate::commands::{GitError, Result, git_command};
use std::path::{Path, PathBuf};

/// The top-level directory of the repository containing `dir`, as reported
/// by `git rev-parse --show-toplevel`.
///
/// # Errors
///
/// Returns [`GitError::NotARepo`] if `dir` is not inside a git working
/// tree, or [`GitError::SpawnError`] if `git` cannot be run.
pub fn repo_root(dir: &Path) -> Result<PathBuf> {
    match git_command(&["rev-parse", "--show-toplevel"], dir) {
        Ok(output) if !output.trim().is_empty() => Ok(PathBuf::from(output.trim())),
        Ok(_) | Err(GitError::CommandFailed { .. }) => Err(GitError::NotARepo(dir.to_path_buf())),
        Err(err) => Err(err),
    }
}
