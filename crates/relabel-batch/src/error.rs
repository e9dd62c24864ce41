//! Error types for the batch engine.

use relabel_core::FieldError;
use relabel_git::GitError;
use std::path::PathBuf;

/// Errors raised while traversing the tree. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// A directory entry could not be read.
    #[error("failed to walk directory tree: {0}")]
    Traverse(#[from] walkdir::Error),
}

/// Errors raised while transforming a single file.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The file could not be read.
    #[error("failed to read {}: {error}", path.display())]
    Read {
        /// Root-relative path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        error: std::io::Error,
    },

    /// The rewritten document could not be produced.
    #[error("failed to serialize {}: {error}", path.display())]
    Serialize {
        /// Root-relative path of the file.
        path: PathBuf,
        /// Underlying codec error.
        error: FieldError,
    },

    /// The rewritten document could not be written back.
    #[error("failed to write {}: {error}", path.display())]
    Write {
        /// Root-relative path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        error: std::io::Error,
    },

    /// The rewritten file could not be staged.
    #[error("failed to stage {}: {error}", path.display())]
    Stage {
        /// Root-relative path of the file.
        path: PathBuf,
        /// Underlying git error.
        error: GitError,
    },
}

impl TransformError {
    /// Root-relative path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Serialize { path, .. }
            | Self::Write { path, .. }
            | Self::Stage { path, .. } => path,
        }
    }
}

/// Errors that abort a batch run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Directory traversal failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// A file failed and the file-error policy is `abort`.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The status snapshot could not be taken.
    #[error("failed to query working tree status: {0}")]
    Status(GitError),

    /// The batch commit failed.
    #[error("failed to commit: {0}")]
    Commit(GitError),

    /// Nothing was staged and the empty-commit policy is `error`.
    #[error("no field definitions were relabeled; nothing to commit")]
    NothingStaged,
}

/// A specialized `Result` type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
