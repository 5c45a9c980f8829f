//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use clap::Parser;
use dupgen_config::{DuplicationJob, MAX_WORKERS};
use path_clean::PathClean;

/// CLI arguments for dupgen.
#[derive(Debug, Parser)]
#[command(
    name = "dupgen",
    about = "Duplicate files at scale with resume support and zip packaging",
    version
)]
pub struct Args {
    /// Source files to duplicate (comma-separated or repeated).
    #[arg(long, short = 's', value_delimiter = ',')]
    pub sources: Vec<PathBuf>,

    /// Copies to produce for each source.
    #[arg(long, short = 'n')]
    pub copies: Option<u64>,

    /// Output directory.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Files per `part_<n>` subfolder (0 = flat output).
    #[arg(long)]
    pub per_subfolder: Option<u64>,

    /// Number of parallel workers (defaults to the number of CPUs).
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Plan and count without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip tasks recorded by a previous run.
    #[arg(long)]
    pub resume: bool,

    /// Use random tokens instead of sequential file names.
    #[arg(long)]
    pub randomize: bool,

    /// Package the output into zip chunks.
    #[arg(long)]
    pub zip: bool,

    /// Files per zip chunk.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Refuse jobs larger than this many files.
    #[arg(long)]
    pub max_limit: Option<u64>,

    /// Skip packaging when any copy failed.
    #[arg(long = "no-package-on-failure")]
    pub no_package_on_failure: bool,

    /// Load the job from a TOML file; explicit flags override its values.
    #[arg(long)]
    pub job: Option<PathBuf>,

    /// Run without prompts.
    #[arg(long)]
    pub non_interactive: bool,

    /// Disable the progress bar (useful for CI environments).
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// Whether the job has to be gathered through interactive prompts.
    #[must_use]
    pub fn needs_prompts(&self) -> bool {
        self.sources.is_empty() && self.job.is_none() && !self.non_interactive
    }

    /// Determine if we should show the progress bar.
    #[must_use]
    pub const fn should_show_progress(&self) -> bool {
        !self.no_progress
    }

    /// Build a job from flags alone.
    ///
    /// # Errors
    ///
    /// * If `--sources`, `--copies` or `--output` is missing
    pub fn build_job(&self) -> Result<DuplicationJob, String> {
        if self.sources.is_empty() {
            return Err("--sources is required in non-interactive mode".to_string());
        }
        let copies = self
            .copies
            .ok_or_else(|| "--copies is required in non-interactive mode".to_string())?;
        let output = self
            .output
            .clone()
            .ok_or_else(|| "--output is required in non-interactive mode".to_string())?;

        let mut job = DuplicationJob::new(self.sources.clone(), copies, output);
        job.workers = num_cpus::get().min(MAX_WORKERS);
        self.apply_overrides(&mut job);
        Ok(job)
    }

    /// Overlay every explicitly given flag onto `job`.
    pub fn apply_overrides(&self, job: &mut DuplicationJob) {
        if !self.sources.is_empty() {
            job.sources.clone_from(&self.sources);
        }
        if let Some(copies) = self.copies {
            job.copies_per_source = copies;
        }
        if let Some(output) = &self.output {
            job.output_dir.clone_from(output);
        }
        if let Some(per_subfolder) = self.per_subfolder {
            job.per_subfolder = per_subfolder;
        }
        if let Some(workers) = self.workers {
            job.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            job.chunk_size = chunk_size;
        }
        if let Some(max_limit) = self.max_limit {
            job.max_limit = max_limit;
        }
        job.dry_run |= self.dry_run;
        job.resume |= self.resume;
        job.randomize |= self.randomize;
        job.archive |= self.zip;
        if self.no_package_on_failure {
            job.package_on_failure = false;
        }
    }
}

/// Normalise `path` and make it absolute against `cwd`.
#[must_use]
pub fn absolute_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        cwd.join(path).clean()
    }
}
