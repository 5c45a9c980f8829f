//! dupgen CLI entry point.
//!
//! Duplicates source files into a bucketed output tree, with resume support
//! and optional zip packaging.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod interactive;
mod output;
mod progress;

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;

use args::Args;
use dupgen_config::load_job_file;
use dupgen_engine::{DuplicationJob, Orchestrator, RunOutcome};
use progress::ProgressManager;

/// Exit status when some tasks or chunks failed, or the run was interrupted.
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        // SAFETY: We're setting this before any other threads are spawned
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    pretty_env_logger::init();

    match run(&args) {
        Ok(Some(RunOutcome::Partial)) => ExitCode::from(EXIT_PARTIAL),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Assemble the job from a job file, flags or prompts.
fn resolve_job(args: &Args) -> Result<DuplicationJob, Box<dyn std::error::Error>> {
    let mut job = if let Some(path) = &args.job {
        let mut job = load_job_file(path)?;
        args.apply_overrides(&mut job);
        job
    } else if args.needs_prompts() {
        let mut job = interactive::prompt_job()?;
        args.apply_overrides(&mut job);
        job
    } else {
        args.build_job()?
    };

    let cwd = env::current_dir()?;
    job.output_dir = args::absolute_path(&cwd, &job.output_dir);
    Ok(job)
}

/// Main application logic.
///
/// Returns `None` when the user declined to start.
fn run(args: &Args) -> Result<Option<RunOutcome>, Box<dyn std::error::Error>> {
    let job = resolve_job(args)?;
    let total = job.total_files();

    output::print_header("dupgen");
    output::print_job(&job, total);

    if args.needs_prompts() && !interactive::confirm_start(total)? {
        println!("Nothing to do. Exiting.");
        return Ok(None);
    }

    let mut orchestrator = Orchestrator::new(job);

    // First ctrl-c stops scheduling; the second one exits immediately.
    let cancel = orchestrator.cancel_flag();
    let interrupts = AtomicUsize::new(0);
    ctrlc::set_handler(move || {
        if interrupts.fetch_add(1, Ordering::SeqCst) == 0 {
            eprintln!("\nInterrupt received, finishing in-flight copies...");
            eprintln!("Press Ctrl+C again to force exit immediately.");
            cancel.store(true, Ordering::SeqCst);
        } else {
            eprintln!("\nForced exit!");
            std::process::exit(130);
        }
    })?;

    let progress = ProgressManager::new(args.should_show_progress(), total);
    let result = orchestrator.run(|p| progress.update(p));
    progress.finish();

    let summary = result?;
    log::debug!("Run finished in state {}", orchestrator.state());

    output::print_summary(&summary);
    Ok(Some(summary.outcome()))
}
