//! The field transformer.
//!
//! Reads one candidate file, decides whether it is eligible, and if so
//! replaces its label with a fresh one, rewrites the file with its original
//! permission bits and stages it.

use crate::error::TransformError;
use relabel_core::{FieldDefinition, FieldError, LabelSource};
use relabel_git::WorkingTree;
use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

/// What the transformer did with one file.
#[derive(Debug)]
pub enum Outcome {
    /// The label was replaced (or would have been, in a dry run).
    Relabeled {
        /// The label before the change.
        old: String,
        /// The generated replacement.
        new: String,
    },
    /// The document is not marked as a test object.
    NotMarked,
    /// The document is marked but its type is not `AutoNumber`.
    UnsupportedType(String),
    /// The file is not a field-definition document.
    NotApplicable(FieldError),
}

/// Applies the relabeling rule to individual files under a root.
#[derive(Debug)]
pub struct FieldTransformer<L> {
    root: PathBuf,
    labels: L,
    dry_run: bool,
}

impl<L: LabelSource> FieldTransformer<L> {
    /// Create a transformer for files under `root`, drawing new labels from
    /// `labels`.
    pub fn new(root: impl Into<PathBuf>, labels: L) -> Self {
        Self {
            root: root.into(),
            labels,
            dry_run: false,
        }
    }

    /// In a dry run eligible files are reported but never written or staged.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Transform the file at `path` (relative to the root).
    ///
    /// Documents that do not parse, are not marked, or are not `AutoNumber`
    /// fields are left untouched and reported through [`Outcome`].
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the file cannot be read, rewritten or
    /// staged. A file that was already rewritten when staging fails is not
    /// restored.
    pub fn transform(
        &mut self,
        path: &Path,
        permissions: &Permissions,
        tree: &mut dyn WorkingTree,
    ) -> Result<Outcome, TransformError> {
        let absolute = self.root.join(path);

        let bytes = fs::read(&absolute).map_err(|error| {
            tracing::error!(path = %path.display(), error = %error, "failed to read file");
            TransformError::Read {
                path: path.to_path_buf(),
                error,
            }
        })?;

        let parsed = std::str::from_utf8(&bytes)
            .map_err(|e| FieldError::Malformed(e.to_string()))
            .and_then(FieldDefinition::parse);
        let mut field = match parsed {
            Ok(field) => field,
            Err(err) => {
                if err.is_malformed() {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                } else {
                    tracing::debug!(path = %path.display(), reason = %err, "not a field definition");
                }
                return Ok(Outcome::NotApplicable(err));
            }
        };

        if !field.test_object {
            tracing::debug!(path = %path.display(), "not marked as a test object");
            return Ok(Outcome::NotMarked);
        }

        if !field.is_auto_number() {
            tracing::info!(
                path = %path.display(),
                field_type = %field.field_type,
                "skipping as only AutoNumber fields are supported"
            );
            return Ok(Outcome::UnsupportedType(field.field_type));
        }

        let new = self.labels.next_label();
        let old = std::mem::replace(&mut field.label, new.clone());
        tracing::info!(path = %path.display(), "changing label from {old} to {new}");

        let output = field.to_xml().map_err(|error| TransformError::Serialize {
            path: path.to_path_buf(),
            error,
        })?;

        if self.dry_run {
            return Ok(Outcome::Relabeled { old, new });
        }

        let write_error = |error| TransformError::Write {
            path: path.to_path_buf(),
            error,
        };
        fs::write(&absolute, output).map_err(write_error)?;
        fs::set_permissions(&absolute, permissions.clone()).map_err(write_error)?;

        tree.stage(path).map_err(|error| TransformError::Stage {
            path: path.to_path_buf(),
            error,
        })?;

        Ok(Outcome::Relabeled { old, new })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
