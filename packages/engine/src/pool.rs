//! Duplication worker pool.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rayon::prelude::*;

use dupgen_copy::{CopyError, ProgressTracker, RunProgress, copy_file, target_matches};
use dupgen_ledger::{ResumeLedger, TaskId};

use crate::error::RunError;
use crate::plan::CopyTask;

/// Shared inputs for every worker.
#[derive(Debug, Clone, Copy)]
pub struct PoolContext<'a> {
    /// Number of parallel workers.
    pub workers: usize,
    /// Validate and estimate only.
    pub dry_run: bool,
    /// Accept existing targets whose size matches the source.
    pub verify_existing: bool,
    /// Tasks completed before this run; never mutated.
    pub completed: &'a HashSet<TaskId>,
    /// Ledger that successful tasks are recorded in.
    pub ledger: &'a ResumeLedger,
    /// Stop signal; set tasks are left unattempted.
    pub cancel: &'a AtomicBool,
}

/// Why a task needed no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Recorded in the resume ledger.
    Ledger,
    /// Target already present with the source's size.
    VerifiedOnDisk,
}

/// Result of executing a single task.
#[derive(Debug)]
pub enum TaskResult {
    /// The target was written (or would be, in a dry run).
    Succeeded {
        /// Bytes written, or estimated in a dry run.
        bytes: u64,
    },
    /// Nothing to do.
    Skipped(SkipReason),
    /// The copy failed.
    Failed(CopyError),
    /// Cancelled before the task started.
    NotAttempted,
}

/// A failed task, kept for the final summary.
#[derive(Debug)]
pub struct TaskFailure {
    /// Task identity.
    pub id: TaskId,
    /// Target that could not be written.
    pub target: PathBuf,
    /// What went wrong.
    pub error: CopyError,
}

/// Aggregate outcome of a pool run.
#[derive(Debug, Default)]
pub struct PoolReport {
    /// Tasks handed to the pool.
    pub total: u64,
    /// Tasks written (or estimated, in a dry run).
    pub succeeded: u64,
    /// Tasks that needed no work, for any reason.
    pub skipped: u64,
    /// Of `skipped`, tasks accepted by on-disk verification.
    pub verified: u64,
    /// Failed tasks, in no particular order.
    pub failed: Vec<TaskFailure>,
    /// Tasks left untouched because of cancellation.
    pub not_attempted: u64,
    /// Bytes written (or estimated, in a dry run).
    pub bytes: u64,
    /// Time spent executing.
    pub elapsed: Duration,
}

/// Execute one task.
///
/// Never panics on I/O problems; failures are returned as
/// [`TaskResult::Failed`]. Successful and verified tasks are recorded in the
/// ledger unless this is a dry run.
#[must_use]
pub fn execute_task(task: &CopyTask, ctx: &PoolContext<'_>) -> TaskResult {
    if ctx.cancel.load(Ordering::SeqCst) {
        return TaskResult::NotAttempted;
    }

    if ctx.completed.contains(&task.id) {
        log::trace!("Task {} already completed", task.id);
        return TaskResult::Skipped(SkipReason::Ledger);
    }

    if ctx.verify_existing && target_matches(&task.target, task.source.len) {
        log::trace!(
            "Task {} verified on disk at {}",
            task.id,
            task.target.display()
        );
        if !ctx.dry_run {
            ctx.ledger.record(task.id);
        }
        return TaskResult::Skipped(SkipReason::VerifiedOnDisk);
    }

    if ctx.dry_run {
        return TaskResult::Succeeded {
            bytes: task.source.len,
        };
    }

    match copy_file(&task.source.path, &task.target) {
        Ok(bytes) => {
            // Only recorded once the file is fully written
            ctx.ledger.record(task.id);
            TaskResult::Succeeded { bytes }
        }
        Err(e) => TaskResult::Failed(e),
    }
}

/// Run `tasks` on a pool of `ctx.workers` threads.
///
/// Workers pull from the shared task iterator; no ordering between tasks is
/// guaranteed. A failing task never stops its siblings. `on_progress` is
/// called after every finished task with a monotonically increasing
/// completed count.
///
/// # Errors
///
/// * If the worker pool cannot be created
pub fn run_tasks<I, F>(
    tasks: I,
    total: u64,
    ctx: &PoolContext<'_>,
    on_progress: F,
) -> Result<PoolReport, RunError>
where
    I: Iterator<Item = CopyTask> + Send,
    F: Fn(&RunProgress) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.workers)
        .thread_name(|i| format!("dupgen-worker-{i}"))
        .build()
        .map_err(|e| RunError::WorkerPool(e.to_string()))?;

    log::info!(
        "Executing {total} task(s) on {} worker(s){}",
        ctx.workers,
        if ctx.dry_run { " (dry run)" } else { "" }
    );

    let tracker = ProgressTracker::new(total);
    let verified = AtomicU64::new(0);
    let not_attempted = AtomicU64::new(0);
    let failures = Mutex::new(Vec::new());
    let last_emitted = Mutex::new(0u64);

    let emit = || {
        let mut last = last_emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = tracker.snapshot();
        if snapshot.completed > *last {
            *last = snapshot.completed;
            on_progress(&snapshot);
        }
    };

    on_progress(&tracker.snapshot());

    pool.install(|| {
        tasks.par_bridge().for_each(|task| {
            match execute_task(&task, ctx) {
                TaskResult::Succeeded { bytes } => tracker.record_success(bytes),
                TaskResult::Skipped(reason) => {
                    if reason == SkipReason::VerifiedOnDisk {
                        verified.fetch_add(1, Ordering::SeqCst);
                    }
                    tracker.record_skip();
                }
                TaskResult::Failed(error) => {
                    log::warn!("Task {} failed: {error}", task.id);
                    failures
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(TaskFailure {
                            id: task.id,
                            target: task.target,
                            error,
                        });
                    tracker.record_failure();
                }
                TaskResult::NotAttempted => {
                    not_attempted.fetch_add(1, Ordering::SeqCst);
                    return;
                }
            }
            emit();
        });
    });

    let mut failed = failures
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    failed.sort_by_key(|f| f.id);

    let report = PoolReport {
        total,
        succeeded: tracker.succeeded(),
        skipped: tracker.skipped(),
        verified: verified.into_inner(),
        failed,
        not_attempted: not_attempted.into_inner(),
        bytes: tracker.bytes(),
        elapsed: tracker.elapsed(),
    };

    log::info!(
        "Executed {} task(s): {} succeeded, {} skipped, {} failed, {} not attempted",
        report.total,
        report.succeeded,
        report.skipped,
        report.failed.len(),
        report.not_attempted
    );

    Ok(report)
}
