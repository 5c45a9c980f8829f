//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

use colored::Colorize;
use dupgen_engine::{DuplicationJob, RunOutcome, RunSummary};

use crate::progress::format_duration;

/// Failed tasks listed individually before the rest is summarised.
const MAX_LISTED_FAILURES: usize = 20;

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{} {}\n", "📄", message.bold());
}

/// Print the resolved job before it runs.
pub fn print_job(job: &DuplicationJob, total: u64) {
    println!("Output:  {}", job.output_dir.display().to_string().cyan());
    println!(
        "Sources: {} × {} copies = {} files",
        job.sources.len(),
        job.copies_per_source,
        total
    );
    println!(
        "Layout:  {}, {} workers{}",
        if job.per_subfolder == 0 {
            "flat".to_string()
        } else {
            format!("{} per subfolder", job.per_subfolder)
        },
        job.workers,
        if job.randomize { ", randomized names" } else { "" }
    );
    if job.dry_run {
        println!("{}", "Dry run: nothing will be written.".yellow());
    }
    println!();
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &RunSummary) {
    println!(
        "{} {} succeeded, {} skipped, {} failed, {} not attempted",
        "•".dimmed(),
        summary.succeeded.to_string().green(),
        summary.skipped,
        summary.failed_count().to_string().red(),
        summary.not_attempted
    );
    if summary.verified > 0 {
        println!(
            "  {} already on disk and recorded without copying",
            summary.verified
        );
    }
    println!(
        "  {}",
        bytes_line(summary.bytes, summary.elapsed, summary.dry_run)
    );

    if !summary.failed.is_empty() {
        println!("\n{}", "Failed tasks:".red().bold());
        for failure in summary.failed.iter().take(MAX_LISTED_FAILURES) {
            println!("  {} {} {}", "✗".red(), failure.id, failure.error);
        }
        if summary.failed.len() > MAX_LISTED_FAILURES {
            println!(
                "  ... and {} more",
                summary.failed.len() - MAX_LISTED_FAILURES
            );
        }
    }

    if let Some(packaging) = &summary.packaging {
        println!();
        for path in &packaging.written {
            println!("{} {}", "✓".green(), path.display());
        }
        for (index, error) in &packaging.failed {
            println!("{} chunk {} {}", "✗".red(), index, error);
        }
    }
    if let Some(error) = &summary.packaging_error {
        print_warning(&format!("Packaging failed: {error}"));
    }

    if summary.interrupted {
        print_warning("Interrupted; rerun with --resume to finish the remaining tasks.");
    }
    if !summary.ledger_persisted && !summary.dry_run {
        print_warning("Resume state could not be saved; a resumed run may redo work.");
    }

    println!();
    match summary.outcome() {
        RunOutcome::Success => println!("{} Done!", "✅"),
        RunOutcome::Partial => println!("{} Finished with problems.", "⚠️"),
    }
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}

/// Describe the bytes moved; dry runs only have an estimate.
#[must_use]
pub fn bytes_line(bytes: u64, elapsed: Duration, dry_run: bool) -> String {
    if dry_run {
        format!("{} would be written (estimated)", format_bytes(bytes))
    } else {
        format!(
            "{} written in {}",
            format_bytes(bytes),
            format_duration(elapsed)
        )
    }
}

/// Format a byte count with a binary unit.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
