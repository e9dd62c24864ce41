//! Candidate discovery.
//!
//! A candidate is any regular file whose root-relative path contains the
//! path filter (case-sensitive substring, `fields` by default) and whose
//! file name does not start with `.`. The filter is deliberately a plain
//! substring match, not "has a directory named fields". Symbolic links are
//! skipped, never followed.

use crate::error::WalkError;
use std::fs::Permissions;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Default path filter.
pub const DEFAULT_PATH_FILTER: &str = "fields";

/// A file selected for transformation.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Path relative to the walk root.
    pub path: PathBuf,
    /// Permission bits of the file as found.
    pub permissions: Permissions,
}

/// Walks a directory tree and yields [`Candidate`]s in file-name order.
#[derive(Debug, Clone)]
pub struct FieldWalker {
    root: PathBuf,
    path_filter: String,
    skip_git_dir: bool,
}

impl FieldWalker {
    /// Create a walker over `root` with the default filter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            path_filter: DEFAULT_PATH_FILTER.to_string(),
            skip_git_dir: true,
        }
    }

    /// Replace the path filter.
    pub fn path_filter(mut self, filter: impl Into<String>) -> Self {
        self.path_filter = filter.into();
        self
    }

    /// Whether `.git` directories are pruned from the walk.
    pub fn skip_git_dir(mut self, skip: bool) -> Self {
        self.skip_git_dir = skip;
        self
    }

    /// Visit every candidate in order, stopping at the first error.
    ///
    /// Traversal errors are converted into the visitor's error type, so an
    /// unreadable directory aborts the walk just like a failing visit.
    ///
    /// # Errors
    ///
    /// Returns the first traversal error or the first error from `visit`.
    pub fn walk<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        E: From<WalkError>,
        F: FnMut(Candidate) -> Result<(), E>,
    {
        let skip_git_dir = self.skip_git_dir;
        let entries = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_git_dir && is_git_dir(entry)));

        for entry in entries {
            let entry = entry.map_err(WalkError::from)?;
            if entry.path_is_symlink() {
                tracing::debug!(path = %entry.path().display(), "skipping symbolic link");
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if !is_candidate(relative, &self.path_filter) {
                continue;
            }

            let permissions = entry.metadata().map_err(WalkError::from)?.permissions();
            tracing::trace!(path = %relative.display(), "found candidate");
            visit(Candidate {
                path: relative.to_path_buf(),
                permissions,
            })?;
        }
        Ok(())
    }

    /// Collect every candidate path. Mostly useful for reporting and tests.
    ///
    /// # Errors
    ///
    /// Returns the first traversal error.
    pub fn candidates(&self) -> Result<Vec<PathBuf>, WalkError> {
        let mut paths = Vec::new();
        self.walk(|candidate: Candidate| {
            paths.push(candidate.path);
            Ok::<_, WalkError>(())
        })?;
        Ok(paths)
    }
}

/// Path rules for a regular file, given its root-relative path.
pub fn is_candidate(relative: &Path, path_filter: &str) -> bool {
    let hidden = relative
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));
    !hidden && relative.to_string_lossy().contains(path_filter)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
