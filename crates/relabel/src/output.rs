//! Output formatting for the `relabel` CLI.
//!
//! Human output mirrors a manual session: the `git status` view of the
//! tree, then the commit that recorded it, then a one-line summary.

use relabel_batch::BatchReport;
use serde::Serialize;
use std::io::{self, Write};

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Ignore broken pipe errors (e.g., piped to `head`)
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Print a batch report, as JSON or as human-readable text.
pub fn print_report(report: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        return output_json(report);
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = write_report(&mut handle, report);
    Ok(())
}

/// Render the human-readable report.
pub fn write_report(out: &mut impl Write, report: &BatchReport) -> io::Result<()> {
    if report.dry_run {
        for relabel in &report.relabeled {
            writeln!(
                out,
                "would relabel {}: {} -> {}",
                relabel.path.display(),
                relabel.old,
                relabel.new
            )?;
        }
    }

    if let Some(status) = &report.status {
        writeln!(out, "{}", status.trim_end())?;
    }

    match (&report.commit_description, &report.commit) {
        (Some(description), _) => writeln!(out, "{}", description.trim_end())?,
        (None, Some(commit)) => writeln!(out, "commit {commit}")?,
        (None, None) => {}
    }

    writeln!(out, "{}", summary_line(report))
}

/// One-line summary of a run.
pub fn summary_line(report: &BatchReport) -> String {
    let skipped = &report.skipped;
    let verb = if report.dry_run { "would relabel" } else { "relabeled" };
    let count = report.relabeled.len();
    let mut line = format!(
        "{verb} {count} {}; skipped {} not marked, {} unsupported type, {} not applicable",
        if count == 1 { "file" } else { "files" },
        skipped.not_marked,
        skipped.unsupported_type,
        skipped.not_applicable,
    );
    if skipped.failed > 0 {
        line.push_str(&format!(", {} failed", skipped.failed));
    }
    line
}
