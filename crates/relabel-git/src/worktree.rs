//! The working-tree abstraction used by the batch engine.
//!
//! [`WorkingTree`] is the only view of version control the rest of the
//! workspace has: stage a path, take a status snapshot, commit. The
//! production implementation, [`GitWorkTree`], drives the `git` binary.

use crate::commands::{GitError, Result, git_command};
use crate::gitdir::repo_root;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// The full hex id of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Wrap a hex commit id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The full id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first seven characters, as git abbreviates by default.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of `git status --porcelain=v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Status of the path in the index (`' '` when unchanged).
    pub index: char,
    /// Status of the path in the working tree (`' '` when unchanged).
    pub worktree: char,
    /// The path, relative to the repository root. Renames keep git's
    /// `old -> new` form.
    pub path: String,
}

/// A snapshot of the working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    /// Changed paths, in the order git reported them.
    pub entries: Vec<StatusEntry>,
}

impl StatusSummary {
    /// Parse porcelain v1 output.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::UnexpectedOutput`] for a line that is too short to
    /// carry the two status columns and a path.
    pub fn parse_porcelain(output: &str) -> Result<Self> {
        let entries = output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut chars = line.chars();
                match (chars.next(), chars.next(), line.get(3..)) {
                    (Some(index), Some(worktree), Some(path)) if !path.is_empty() => {
                        Ok(StatusEntry {
                            index,
                            worktree,
                            path: path.to_string(),
                        })
                    }
                    _ => Err(GitError::UnexpectedOutput(format!("status line {line:?}"))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Returns `true` if nothing is modified, staged or untracked.
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("nothing to commit, working tree clean");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}{} {}", entry.index, entry.worktree, entry.path)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The version-control staging area, as seen by the batch engine.
///
/// Implementations are driven by a single caller; nothing here is meant to
/// be invoked concurrently.
pub trait WorkingTree {
    /// Mark the current on-disk state of `path` (relative to the walk root)
    /// for inclusion in the next commit.
    fn stage(&mut self, path: &Path) -> Result<()>;

    /// Take a status snapshot.
    fn status(&self) -> Result<StatusSummary>;

    /// Commit everything staged. With `allow_empty` a commit is created even
    /// when nothing is staged; otherwise an empty commit is an error.
    fn commit(&mut self, message: &str, allow_empty: bool) -> Result<CommitId>;

    /// One human-readable description of a commit.
    fn describe(&self, commit: &CommitId) -> Result<String> {
        Ok(commit.to_string())
    }
}

// ---------------------------------------------------------------------------
// Git implementation
// ---------------------------------------------------------------------------

/// A [`WorkingTree`] backed by the `git` binary.
///
/// Paths handed to [`WorkingTree::stage`] are resolved against `workdir`,
/// which may be any directory inside the repository.
#[derive(Debug, Clone)]
pub struct GitWorkTree {
    workdir: PathBuf,
    root: PathBuf,
    author: Option<String>,
    no_gpg_sign: bool,
}

impl GitWorkTree {
    /// Open the working tree containing `workdir`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotARepo`] if `workdir` is not inside a git
    /// repository.
    pub fn open(workdir: &Path) -> Result<Self> {
        let root = repo_root(workdir)?;
        tracing::debug!(root = %root.display(), "opened repository");
        Ok(Self {
            workdir: workdir.to_path_buf(),
            root,
            author: None,
            no_gpg_sign: false,
        })
    }

    /// Commit as `author` (`"Name <email>"`) instead of git's configured
    /// identity. An empty string keeps the configured identity.
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string()).filter(|a| !a.is_empty());
        self
    }

    /// Pass `--no-gpg-sign` to `git commit`.
    pub fn with_no_gpg_sign(mut self, no_gpg_sign: bool) -> Self {
        self.no_gpg_sign = no_gpg_sign;
        self
    }

    /// The repository's top-level directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        git_command(args, &self.workdir)
    }
}

impl WorkingTree for GitWorkTree {
    fn stage(&mut self, path: &Path) -> Result<()> {
        let path = path
            .to_str()
            .ok_or_else(|| GitError::UnexpectedOutput(format!("non UTF-8 path {path:?}")))?;
        self.git(&["add", "--", path])?;
        Ok(())
    }

    fn status(&self) -> Result<StatusSummary> {
        let output = self.git(&["status", "--porcelain=v1"])?;
        StatusSummary::parse_porcelain(&output)
    }

    fn commit(&mut self, message: &str, allow_empty: bool) -> Result<CommitId> {
        let author_arg = self.author.as_ref().map(|a| format!("--author={a}"));
        let mut args = vec!["commit", "-q", "-m", message];
        if let Some(author_arg) = &author_arg {
            args.push(author_arg);
        }
        if self.no_gpg_sign {
            args.push("--no-gpg-sign");
        }
        if allow_empty {
            args.push("--allow-empty");
        }
        self.git(&args)?;

        let head = self.git(&["rev-parse", "HEAD"])?;
        Ok(CommitId::new(head.trim()))
    }

    fn describe(&self, commit: &CommitId) -> Result<String> {
        self.git(&[
            "show",
            "-s",
            "--format=commit %H%nAuthor: %an <%ae>%nDate:   %ad%n%n    %s",
            commit.as_str(),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
