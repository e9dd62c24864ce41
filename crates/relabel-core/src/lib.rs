//! Core types for the relabel tool.
//!
//! This crate contains the field-definition document model, its XML codec,
//! and the label generators used when a field is relabeled.

pub mod field;
pub mod label;

pub use field::{AUTO_NUMBER, ExtraElement, FieldDefinition, FieldError, XML_DECLARATION};
pub use label::{LabelSource, RandomLabels};
