//! Git integration for the relabel tool.
//!
//! This crate provides repository discovery, `git` subprocess execution,
//! and the [`WorkingTree`] abstraction the batch engine stages and commits
//! through.

pub mod commands;
pub mod gitdir;
pub mod worktree;

pub use commands::{GitError, git_command};
pub use worktree::{CommitId, GitWorkTree, StatusEntry, StatusSummary, WorkingTree};
