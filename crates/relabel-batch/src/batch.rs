//! Commit orchestration.
//!
//! [`run_batch`] drives one full pass: walk the tree, transform every
//! candidate, take a status snapshot and record all staged edits in a single
//! commit.

use crate::error::{BatchError, Result};
use crate::transform::{FieldTransformer, Outcome};
use crate::walker::FieldWalker;
use relabel_config::{EmptyCommitPolicy, FileErrorPolicy, RelabelConfig};
use relabel_core::LabelSource;
use relabel_git::WorkingTree;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything a batch run needs besides the tree, labels and working tree.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Substring a candidate's relative path must contain.
    pub path_filter: String,
    /// Prune `.git` directories from the walk.
    pub skip_git_dir: bool,
    /// Abort or continue when a single file fails.
    pub on_file_error: FileErrorPolicy,
    /// What to do when nothing was staged.
    pub on_empty: EmptyCommitPolicy,
    /// Message of the batch commit.
    pub message: String,
    /// Report eligible files without writing, staging or committing.
    pub dry_run: bool,
    /// Create the batch commit. When `false` edits are left staged.
    pub commit: bool,
}

impl BatchOptions {
    /// Derive options from a loaded configuration.
    pub fn from_config(config: &RelabelConfig) -> Self {
        Self {
            path_filter: config.walk.path_filter.clone(),
            skip_git_dir: config.walk.skip_git_dir,
            on_file_error: config.walk.on_file_error,
            on_empty: config.commit.on_empty,
            message: config.commit.message.clone(),
            dry_run: false,
            commit: true,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&RelabelConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One relabeled file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relabel {
    /// Path relative to the walk root.
    pub path: PathBuf,
    /// Label before the change.
    pub old: String,
    /// Label after the change.
    pub new: String,
}

/// Why candidates were left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Parsed, but not marked as a test object.
    pub not_marked: usize,
    /// Marked, but not an `AutoNumber` field.
    pub unsupported_type: usize,
    /// Not a field-definition document at all.
    pub not_applicable: usize,
    /// Failed and skipped under the `skip` file-error policy.
    pub failed: usize,
}

/// The result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Files whose label was replaced.
    pub relabeled: Vec<Relabel>,
    /// Candidates left alone, by reason.
    pub skipped: SkipCounts,
    /// Paths staged by this run.
    pub staged: Vec<PathBuf>,
    /// Status snapshot taken after the walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Id of the batch commit, if one was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Human-readable description of the batch commit.
    #[serde(skip)]
    pub commit_description: Option<String>,
}

impl BatchReport {
    fn record(&mut self, path: &Path, outcome: Outcome, dry_run: bool) {
        match outcome {
            Outcome::Relabeled { old, new } => {
                if !dry_run {
                    self.staged.push(path.to_path_buf());
                }
                self.relabeled.push(Relabel {
                    path: path.to_path_buf(),
                    old,
                    new,
                });
            }
            Outcome::NotMarked => self.skipped.not_marked += 1,
            Outcome::UnsupportedType(_) => self.skipped.unsupported_type += 1,
            Outcome::NotApplicable(_) => self.skipped.not_applicable += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run one batch over `root`.
///
/// Files are processed one at a time in walk order. Edits already written
/// before a fatal error stay on disk and staged; nothing is rolled back.
///
/// # Errors
///
/// Returns [`BatchError`] for traversal failures, per-file failures under
/// the `abort` policy, status or commit failures, and an empty batch under
/// the `error` empty-commit policy.
pub fn run_batch<L: LabelSource>(
    root: &Path,
    options: &BatchOptions,
    labels: L,
    tree: &mut dyn WorkingTree,
) -> Result<BatchReport> {
    let walker = FieldWalker::new(root)
        .path_filter(options.path_filter.clone())
        .skip_git_dir(options.skip_git_dir);
    let mut transformer = FieldTransformer::new(root, labels).dry_run(options.dry_run);
    let mut report = BatchReport {
        dry_run: options.dry_run,
        ..Default::default()
    };

    walker.walk(|candidate| {
        match transformer.transform(&candidate.path, &candidate.permissions, &mut *tree) {
            Ok(outcome) => report.record(&candidate.path, outcome, options.dry_run),
            Err(err) if options.on_file_error == FileErrorPolicy::Skip => {
                tracing::warn!(path = %err.path().display(), error = %err, "skipping file");
                report.skipped.failed += 1;
            }
            Err(err) => return Err(BatchError::from(err)),
        }
        Ok(())
    })?;

    tracing::info!(
        relabeled = report.relabeled.len(),
        not_marked = report.skipped.not_marked,
        unsupported_type = report.skipped.unsupported_type,
        not_applicable = report.skipped.not_applicable,
        failed = report.skipped.failed,
        "walk finished"
    );

    if options.dry_run {
        return Ok(report);
    }

    let status = tree.status().map_err(BatchError::Status)?;
    report.status = Some(status.to_string());

    if !options.commit {
        return Ok(report);
    }

    let allow_empty = if report.staged.is_empty() {
        match options.on_empty {
            EmptyCommitPolicy::Skip => {
                tracing::info!("nothing relabeled; skipping commit");
                return Ok(report);
            }
            EmptyCommitPolicy::Error => return Err(BatchError::NothingStaged),
            EmptyCommitPolicy::Allow => true,
        }
    } else {
        false
    };

    let commit = tree
        .commit(&options.message, allow_empty)
        .map_err(BatchError::Commit)?;
    tracing::info!(commit = %commit.short(), files = report.staged.len(), "committed");

    report.commit_description = match tree.describe(&commit) {
        Ok(description) => Some(description),
        Err(err) => {
            tracing::warn!(error = %err, "could not describe commit");
            None
        }
    };
    report.commit = Some(commit.to_string());
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
