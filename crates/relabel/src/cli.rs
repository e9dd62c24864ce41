//! Clap CLI definitions for the `relabel` command.

use clap::{Args, Parser};
use std::path::PathBuf;

/// relabel -- randomize labels of marked AutoNumber fields.
///
/// Walks a working tree for field-definition files, gives every AutoNumber
/// field marked with `x-gs-devobject` a fresh random label, stages the
/// rewritten files and records them in one commit.
#[derive(Parser, Debug)]
#[command(
    name = "relabel",
    about = "Randomize labels of marked AutoNumber field definitions and commit the result",
    version
)]
pub struct Cli {
    /// Root of the tree to walk (default: current directory).
    pub root: Option<PathBuf>,

    /// Configuration file (default: <ROOT>/relabel.yaml when present).
    #[arg(long, env = "RELABEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the commit message.
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// Report what would change without writing, staging or committing.
    #[arg(long)]
    pub dry_run: bool,

    /// Stage rewritten files but do not commit.
    #[arg(long)]
    pub no_commit: bool,

    /// Print the effective configuration as YAML and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Output and logging flags.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output the batch report in JSON format.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output (warnings and errors only).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
