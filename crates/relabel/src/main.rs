//! `relabel` -- randomize labels of marked AutoNumber field definitions.
//!
//! Thin binary over the `relabel-*` crates: resolve arguments and
//! configuration, open the repository, run the batch and print the report.

mod cli;
mod context;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use relabel_batch::run_batch;
use relabel_git::GitWorkTree;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GlobalArgs};
use crate::context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    // Handle errors: print message and exit with code 1
    if let Err(e) = run(&cli) {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(global: &GlobalArgs) {
    let default = if global.verbose {
        "relabel=debug"
    } else if global.quiet {
        "relabel=warn"
    } else {
        "relabel=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = RuntimeContext::from_cli(cli)?;

    if cli.print_config {
        print!("{}", ctx.config.to_yaml()?);
        return Ok(());
    }

    let commit = &ctx.config.commit;
    let mut tree = GitWorkTree::open(&ctx.root)
        .with_context(|| format!("cannot open repository at {}", ctx.root.display()))?
        .with_author(&commit.author)
        .with_no_gpg_sign(commit.no_gpg_sign);

    tracing::debug!(
        root = %ctx.root.display(),
        repo = %tree.root().display(),
        dry_run = ctx.dry_run,
        "starting batch"
    );
    let report = run_batch(&ctx.root, &ctx.batch_options(), ctx.labels(), &mut tree)?;
    output::print_report(&report, ctx.json)
}
