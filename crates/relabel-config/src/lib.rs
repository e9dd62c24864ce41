//! Configuration management for the relabel tool.
//!
//! Settings are layered: built-in defaults, then an optional `relabel.yaml`
//! file, then `RELABEL_*` environment variables.

pub mod config;

pub use config::{
    CommitConfig, ConfigError, EmptyCommitPolicy, FileErrorPolicy, LabelConfig, RelabelConfig,
    WalkConfig, load_config,
};
