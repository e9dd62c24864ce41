//! Git command execution wrappers.
//!
//! Provides a thin wrapper around `git` subprocess invocation so that the
//! rest of the codebase does not need to deal with `std::process::Command`
//! directly.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when running git commands.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be found or spawned.
    #[error("failed to execute git: {0}")]
    SpawnError(#[from] std::io::Error),

    /// The git command exited with a non-zero status.
    #[error("git {command} failed (exit code {code:?}): {message}")]
    CommandFailed {
        /// The git subcommand that failed, e.g. `commit`.
        command: String,
        /// The exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// The content of stderr, or stdout when stderr was empty.
        message: String,
    },

    /// The directory is not inside a git repository.
    #[error("not a git repository: {}", .0.display())]
    NotARepo(PathBuf),

    /// Git produced output this crate could not interpret.
    #[error("unexpected git output: {0}")]
    UnexpectedOutput(String),
}

/// A specialized `Result` type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Execute a `git` command with the given arguments and working directory.
///
/// Returns stdout with trailing whitespace removed. Leading whitespace is
/// kept because it is significant in porcelain formats.
///
/// # Errors
///
/// Returns [`GitError::SpawnError`] if `git` cannot be found, or
/// [`GitError::CommandFailed`] if the command exits with a non-zero status.
///
/// # Examples
///
/// ```no_run
/// use relabel_git::commands::git_command;
/// use std::path::Path;
///
/// let head = git_command(&["rev-parse", "HEAD"], Path::new(".")).unwrap();
/// println!("HEAD is {head}");
/// ```
pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    tracing::debug!(?args, cwd = %cwd.display(), "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        // `git commit` with nothing to commit explains itself on stdout.
        let message = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(GitError::CommandFailed {
            command: args.first().copied().unwrap_or_default().to_string(),
            code: output.status.code(),
            message,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    Ok(stdout)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
