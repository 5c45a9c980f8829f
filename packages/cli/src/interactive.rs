//! Interactive prompts using dialoguer.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use dupgen_config::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LIMIT, DEFAULT_WORKERS, DuplicationJob};

/// Split a comma-separated list of paths, dropping empty entries.
fn split_sources(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn positive<T: PartialOrd + Default>(value: &T) -> Result<(), &'static str> {
    if *value > T::default() {
        Ok(())
    } else {
        Err("Must be greater than zero")
    }
}

fn yes_no(prompt: &str) -> io::Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Prompt for every job field.
///
/// # Errors
///
/// * If the user cancels any prompt
pub fn prompt_job() -> io::Result<DuplicationJob> {
    let sources: String = Input::new()
        .with_prompt("Source files (comma-separated)")
        .validate_with(|input: &String| {
            if split_sources(input).is_empty() {
                Err("At least one source is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let copies: u64 = Input::new()
        .with_prompt("Copies per source")
        .validate_with(|v: &u64| positive(v))
        .interact_text()?;

    let output: String = Input::new()
        .with_prompt("Output directory")
        .interact_text()?;

    let mut job = DuplicationJob::new(split_sources(&sources), copies, PathBuf::from(output));

    job.per_subfolder = Input::new()
        .with_prompt("Files per subfolder (0 = none)")
        .default(0)
        .interact_text()?;

    job.workers = Input::new()
        .with_prompt("Parallel workers")
        .default(DEFAULT_WORKERS)
        .validate_with(|v: &usize| positive(v))
        .interact_text()?;

    job.dry_run = yes_no("Dry-run?")?;
    job.resume = yes_no("Resume mode?")?;
    job.randomize = yes_no("Randomize filenames?")?;
    job.archive = yes_no("Zip output?")?;

    if job.archive {
        job.chunk_size = Input::new()
            .with_prompt("ZIP chunk size")
            .default(DEFAULT_CHUNK_SIZE)
            .validate_with(|v: &usize| positive(v))
            .interact_text()?;
    }

    job.max_limit = Input::new()
        .with_prompt("Max safety limit")
        .default(DEFAULT_MAX_LIMIT)
        .validate_with(|v: &u64| positive(v))
        .interact_text()?;

    Ok(job)
}

/// Ask whether to go ahead with a job of `total` files.
///
/// # Errors
///
/// * If the user cancels the prompt
pub fn confirm_start(total: u64) -> io::Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Create {total} files?"))
        .default(true)
        .interact()?)
}
