//! Error types for the duplication engine.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

use dupgen_config::ValidationError;
use dupgen_ledger::TaskId;

/// Errors that stop planning before any worker starts.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A source could not be opened or inspected.
    #[error("Source unreadable {}: {source}", path.display())]
    SourceUnreadable {
        /// Source path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A source has no file name to derive targets from.
    #[error("Source has no file name: {}", .0.display())]
    SourceWithoutName(PathBuf),

    /// Two tasks would write the same target.
    #[error("Tasks {first} and {second} both target {}", target.display())]
    TargetCollision {
        /// The colliding target path.
        target: PathBuf,
        /// The first task claiming the target.
        first: TaskId,
        /// The second task claiming the target.
        second: TaskId,
    },
}

/// Errors that abort a run.
///
/// Files already written stay on disk; a later resumed run picks them up.
#[derive(Debug, Error)]
pub enum RunError {
    /// The job failed validation.
    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    /// Planning failed.
    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),

    /// The output root cannot be created or written.
    #[error("Output directory unwritable {}: {source}", path.display())]
    OutputUnwritable {
        /// Output root.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}
