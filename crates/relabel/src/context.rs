//! Runtime context for a run.
//!
//! The [`RuntimeContext`] holds everything resolved from the command line
//! and configuration before any file is touched.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use relabel_batch::BatchOptions;
use relabel_config::{RelabelConfig, load_config};
use relabel_core::RandomLabels;

use crate::cli::Cli;

/// Runtime state resolved once in `main`.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Root of the walk.
    pub root: PathBuf,

    /// Effective configuration, after CLI overrides.
    pub config: RelabelConfig,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Report without writing.
    pub dry_run: bool,

    /// Stage without committing.
    pub no_commit: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed arguments.
    ///
    /// The root defaults to the current directory. CLI flags override the
    /// loaded configuration.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => env::current_dir().context("cannot determine current directory")?,
        };
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }

        let mut config = load_config(&root, cli.config.as_deref())?;
        if let Some(message) = &cli.message {
            config.commit.message = message.clone();
            config.validate()?;
        }

        Ok(Self {
            root,
            config,
            json: cli.global.json,
            dry_run: cli.dry_run,
            no_commit: cli.no_commit,
        })
    }

    /// Batch options for this run.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            dry_run: self.dry_run,
            commit: !self.no_commit,
            ..BatchOptions::from_config(&self.config)
        }
    }

    /// The label generator for this run: seeded from configuration when a
    /// seed is set, otherwise from the clock.
    pub fn labels(&self) -> RandomLabels {
        let labels = &self.config.labels;
        match labels.seed {
            Some(seed) => RandomLabels::with_seed(labels.length, seed),
            None => RandomLabels::new(labels.length),
        }
    }
}
