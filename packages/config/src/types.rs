//! Job configuration types.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default number of parallel workers.
pub const DEFAULT_WORKERS: usize = 4;
/// Upper bound on parallel workers; each worker is an OS thread.
pub const MAX_WORKERS: usize = 1024;
/// Default number of files per archive chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 5000;
/// Default safety limit on total produced files.
pub const DEFAULT_MAX_LIMIT: u64 = 50_000;
/// Default number of ledger records between checkpoint flushes.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 500;

const fn default_workers() -> usize {
    DEFAULT_WORKERS
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_max_limit() -> u64 {
    DEFAULT_MAX_LIMIT
}

const fn default_checkpoint_interval() -> u64 {
    DEFAULT_CHECKPOINT_INTERVAL
}

const fn default_true() -> bool {
    true
}

/// A fully-resolved duplication job.
///
/// Front-ends construct this from flags, a job file or prompts; the engine
/// never looks at anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationJob {
    /// Source files to duplicate.
    pub sources: Vec<PathBuf>,

    /// Number of copies produced for each source.
    pub copies_per_source: u64,

    /// Root of the output tree.
    pub output_dir: PathBuf,

    /// Files per `part_<n>` subfolder (0 = flat output).
    #[serde(default)]
    pub per_subfolder: u64,

    /// Number of parallel workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Use random tokens instead of sequential file names.
    #[serde(default)]
    pub randomize: bool,

    /// Package the output tree into zip chunks after duplication.
    #[serde(default)]
    pub archive: bool,

    /// Files per archive chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Safety limit on `copies_per_source * sources.len()`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,

    /// Skip work recorded in the resume ledger.
    #[serde(default)]
    pub resume: bool,

    /// Validate and estimate only; write nothing.
    #[serde(default)]
    pub dry_run: bool,

    /// Still package successful output when some tasks failed.
    #[serde(default = "default_true")]
    pub package_on_failure: bool,

    /// Ledger records between checkpoint flushes (0 = only flush at the end).
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,

    /// On resume, accept existing targets whose size matches the source.
    #[serde(default = "default_true")]
    pub verify_existing: bool,
}

impl DuplicationJob {
    /// Create a job with default settings for everything but the essentials.
    #[must_use]
    pub fn new(sources: Vec<PathBuf>, copies_per_source: u64, output_dir: PathBuf) -> Self {
        Self {
            sources,
            copies_per_source,
            output_dir,
            per_subfolder: 0,
            workers: DEFAULT_WORKERS,
            randomize: false,
            archive: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_limit: DEFAULT_MAX_LIMIT,
            resume: false,
            dry_run: false,
            package_on_failure: true,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            verify_existing: true,
        }
    }

    /// Total number of files the job would produce, or `None` on overflow.
    #[must_use]
    pub fn checked_total(&self) -> Option<u64> {
        u64::try_from(self.sources.len())
            .ok()
            .and_then(|n| n.checked_mul(self.copies_per_source))
    }

    /// Total number of files the job would produce, saturating on overflow.
    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    /// Check every pre-execution invariant.
    ///
    /// Only reads metadata; never creates or modifies anything.
    ///
    /// # Errors
    ///
    /// * If there are no sources, zero copies or zero workers
    /// * If more than [`MAX_WORKERS`] workers are requested
    /// * If archiving is requested with a zero chunk size
    /// * If the total file count exceeds `max_limit`
    /// * If any source is missing or not a regular file
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sources.is_empty() {
            return Err(ValidationError::NoSources);
        }
        if self.copies_per_source == 0 {
            return Err(ValidationError::ZeroCopies);
        }
        if self.workers == 0 {
            return Err(ValidationError::ZeroWorkers);
        }
        if self.workers > MAX_WORKERS {
            return Err(ValidationError::TooManyWorkers {
                requested: self.workers,
                limit: MAX_WORKERS,
            });
        }
        if self.archive && self.chunk_size == 0 {
            return Err(ValidationError::ZeroChunkSize);
        }

        match self.checked_total() {
            Some(total) if total <= self.max_limit => {}
            _ => {
                return Err(ValidationError::LimitExceeded {
                    requested: self.total_files(),
                    limit: self.max_limit,
                });
            }
        }

        for source in &self.sources {
            if !source.exists() {
                return Err(ValidationError::SourceNotFound(source.clone()));
            }
            if !source.is_file() {
                return Err(ValidationError::SourceNotFile(source.clone()));
            }
        }

        log::debug!(
            "Validated job: {} source(s) x {} copies = {} files",
            self.sources.len(),
            self.copies_per_source,
            self.total_files()
        );

        Ok(())
    }
}
