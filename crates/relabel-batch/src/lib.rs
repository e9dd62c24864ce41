//! Batch relabeling engine.
//!
//! A run walks a directory tree for field-definition files
//! ([`walker`]), relabels the eligible ones and stages them
//! ([`transform`]), then records everything in one commit ([`batch`]).

pub mod batch;
pub mod error;
pub mod transform;
pub mod walker;

pub use batch::{BatchOptions, BatchReport, Relabel, SkipCounts, run_batch};
pub use error::{BatchError, TransformError, WalkError};
pub use transform::{FieldTransformer, Outcome};
pub use walker::{Candidate, FieldWalker};
