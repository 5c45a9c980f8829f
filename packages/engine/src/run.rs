//! Run orchestration: validate, plan, execute, package.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dupgen_archive::{ArchiveError, PackagingReport, package_output};
use dupgen_config::DuplicationJob;
use dupgen_copy::RunProgress;
use dupgen_ledger::ResumeLedger;

use crate::error::RunError;
use crate::plan::plan;
use crate::pool::{PoolContext, PoolReport, TaskFailure, run_tasks};

const WRITE_PROBE: &str = ".dupgen_write_probe";

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Ready,
    /// Checking limits and sources.
    Validating,
    /// Expanding tasks, preparing the output root and loading resume state.
    Planning,
    /// Workers are copying.
    Executing,
    /// Writing archive chunks.
    Packaging,
    /// Finished with a summary.
    Done,
    /// Stopped by a fatal error.
    Aborted,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Validating => write!(f, "validating"),
            Self::Planning => write!(f, "planning"),
            Self::Executing => write!(f, "executing"),
            Self::Packaging => write!(f, "packaging"),
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Overall outcome of a run that was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every task is done and packaging (if any) succeeded.
    Success,
    /// The run completed with failed tasks, failed chunks or an interrupt.
    Partial,
}

/// Final summary of a run.
#[derive(Debug)]
pub struct RunSummary {
    /// Tasks planned.
    pub planned: u64,
    /// Tasks written (or estimated, in a dry run).
    pub succeeded: u64,
    /// Tasks that were already done.
    pub skipped: u64,
    /// Of `skipped`, tasks accepted by on-disk verification.
    pub verified: u64,
    /// Failed tasks with their reasons.
    pub failed: Vec<TaskFailure>,
    /// Tasks never started because the run was interrupted.
    pub not_attempted: u64,
    /// Bytes written (or estimated, in a dry run).
    pub bytes: u64,
    /// Time spent executing tasks.
    pub elapsed: Duration,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Whether a stop signal arrived.
    pub interrupted: bool,
    /// Whether the resume ledger reached disk.
    pub ledger_persisted: bool,
    /// Packaging results, if packaging ran.
    pub packaging: Option<PackagingReport>,
    /// Packaging could not start at all.
    pub packaging_error: Option<ArchiveError>,
}

impl RunSummary {
    fn from_pool(report: PoolReport, dry_run: bool, interrupted: bool) -> Self {
        Self {
            planned: report.total,
            succeeded: report.succeeded,
            skipped: report.skipped,
            verified: report.verified,
            failed: report.failed,
            not_attempted: report.not_attempted,
            bytes: report.bytes,
            elapsed: report.elapsed,
            dry_run,
            interrupted,
            ledger_persisted: false,
            packaging: None,
            packaging_error: None,
        }
    }

    /// Number of failed tasks.
    #[must_use]
    pub fn failed_count(&self) -> u64 {
        self.failed.len() as u64
    }

    /// Overall outcome.
    #[must_use]
    pub fn outcome(&self) -> RunOutcome {
        let packaging_ok = self.packaging_error.is_none()
            && self
                .packaging
                .as_ref()
                .is_none_or(PackagingReport::is_complete);

        if self.failed.is_empty() && !self.interrupted && packaging_ok {
            RunOutcome::Success
        } else {
            RunOutcome::Partial
        }
    }
}

/// Drives a job through validation, planning, execution and packaging.
#[derive(Debug)]
pub struct Orchestrator {
    job: DuplicationJob,
    cancel: Arc<AtomicBool>,
    state: RunState,
}

impl Orchestrator {
    /// Create an orchestrator for `job`.
    #[must_use]
    pub fn new(job: DuplicationJob) -> Self {
        Self {
            job,
            cancel: Arc::new(AtomicBool::new(false)),
            state: RunState::Ready,
        }
    }

    /// The job being run.
    #[must_use]
    pub const fn job(&self) -> &DuplicationJob {
        &self.job
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Flag that stops the run when set.
    ///
    /// In-flight copies finish, the rest are left unattempted, and the
    /// ledger is flushed with whatever completed.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Run state: {} -> {next}", self.state);
        self.state = next;
    }

    /// Run the job to completion.
    ///
    /// `on_progress` receives raw counters during execution.
    ///
    /// # Errors
    ///
    /// * If the job fails validation
    /// * If a source cannot be read or targets would collide
    /// * If the output root cannot be created or written
    /// * If the worker pool cannot start
    pub fn run<F>(&mut self, on_progress: F) -> Result<RunSummary, RunError>
    where
        F: Fn(&RunProgress) + Sync,
    {
        match self.execute(on_progress) {
            Ok(summary) => {
                self.transition(RunState::Done);
                Ok(summary)
            }
            Err(e) => {
                log::error!("Run aborted: {e}");
                self.transition(RunState::Aborted);
                Err(e)
            }
        }
    }

    fn execute<F>(&mut self, on_progress: F) -> Result<RunSummary, RunError>
    where
        F: Fn(&RunProgress) + Sync,
    {
        self.transition(RunState::Validating);
        self.job.validate()?;

        self.transition(RunState::Planning);
        let plan = plan(&self.job)?;
        if !self.job.dry_run {
            prepare_output(&self.job.output_dir)?;
        }
        let ledger = if self.job.resume {
            ResumeLedger::load(
                &self.job.output_dir,
                plan.naming(),
                self.job.checkpoint_interval,
            )
        } else {
            ResumeLedger::fresh(
                &self.job.output_dir,
                plan.naming(),
                self.job.checkpoint_interval,
            )
        };
        let completed = ledger.completed();

        self.transition(RunState::Executing);
        let ctx = PoolContext {
            workers: self.job.workers,
            dry_run: self.job.dry_run,
            verify_existing: self.job.resume && self.job.verify_existing,
            completed: &completed,
            ledger: &ledger,
            cancel: &self.cancel,
        };
        let report = run_tasks(plan.tasks(), plan.total_tasks(), &ctx, on_progress)?;

        let interrupted = self.cancel.load(Ordering::SeqCst);
        if interrupted {
            log::warn!(
                "Interrupted: {} task(s) not attempted",
                report.not_attempted
            );
        }

        let mut summary = RunSummary::from_pool(report, self.job.dry_run, interrupted);

        if !self.job.dry_run {
            summary.ledger_persisted = match ledger.persist() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Resume state not saved: {e}");
                    false
                }
            };
        }

        if self.should_package(&summary) {
            self.transition(RunState::Packaging);
            match package_output(&self.job.output_dir, self.job.chunk_size) {
                Ok(packaging) => summary.packaging = Some(packaging),
                Err(e) => {
                    log::warn!("Packaging failed: {e}");
                    summary.packaging_error = Some(e);
                }
            }
        }

        Ok(summary)
    }

    fn should_package(&self, summary: &RunSummary) -> bool {
        if !self.job.archive || self.job.dry_run || summary.interrupted {
            return false;
        }
        if !summary.failed.is_empty() && !self.job.package_on_failure {
            log::info!(
                "Skipping packaging: {} task(s) failed",
                summary.failed.len()
            );
            return false;
        }
        true
    }
}

/// Create the output root and prove it is writable.
fn prepare_output(output_dir: &Path) -> Result<(), RunError> {
    let unwritable = |e| RunError::OutputUnwritable {
        path: output_dir.to_path_buf(),
        source: e,
    };

    fs::create_dir_all(output_dir).map_err(unwritable)?;

    let probe = output_dir.join(WRITE_PROBE);
    fs::write(&probe, b"").map_err(unwritable)?;
    fs::remove_file(&probe).map_err(unwritable)?;

    Ok(())
}
