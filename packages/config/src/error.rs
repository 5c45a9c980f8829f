//! Error types for job configuration.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a job file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the job file.
    #[error("Failed to read job file {}: {source}", path.display())]
    ReadError {
        /// Path to the file that couldn't be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML job file.
    #[error("Failed to parse TOML job file {}: {source}", path.display())]
    TomlParseError {
        /// Path to the file that couldn't be parsed.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// A job that must not be executed.
///
/// Raised before any filesystem mutation happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No source files were given.
    #[error("No source files provided")]
    NoSources,

    /// Copies per source must be positive.
    #[error("Copies per source must be greater than 0")]
    ZeroCopies,

    /// Worker count must be positive.
    #[error("Worker count must be greater than 0")]
    ZeroWorkers,

    /// Worker count exceeds the thread cap.
    #[error("Requested {requested} workers exceeds limit {limit}")]
    TooManyWorkers {
        /// Workers requested.
        requested: usize,
        /// Maximum allowed workers.
        limit: usize,
    },

    /// Archiving needs a positive chunk size.
    #[error("Archive chunk size must be greater than 0")]
    ZeroChunkSize,

    /// The requested file count exceeds the safety limit.
    #[error("Requested {requested} files exceeds limit {limit}")]
    LimitExceeded {
        /// Total files the job would produce (saturated on overflow).
        requested: u64,
        /// The configured safety limit.
        limit: u64,
    },

    /// A source file is missing.
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A source path exists but is not a regular file.
    #[error("Source is not a regular file: {}", .0.display())]
    SourceNotFile(PathBuf),
}
