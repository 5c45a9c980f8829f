//! Parallel duplication engine for dupgen.
//!
//! This crate turns a validated [`DuplicationJob`] into files on disk:
//!
//! * Path planning: `(source, copy)` pairs to concrete target paths
//! * A bounded worker pool that copies tasks in parallel with per-task
//!   error isolation
//! * Resume support through the shared [`ResumeLedger`]
//! * Optional zip packaging once duplication has finished
//!
//! # Example
//!
//! ```rust,ignore
//! use dupgen_engine::{Orchestrator, RunProgress};
//!
//! let mut orchestrator = Orchestrator::new(job);
//! let summary = orchestrator.run(|p: &RunProgress| {
//!     println!("{}/{} files", p.completed, p.total);
//! })?;
//! println!("{:?}", summary.outcome());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod plan;
mod pool;
mod run;

pub use dupgen_archive::PackagingReport;
pub use dupgen_config::{DuplicationJob, ValidationError};
pub use dupgen_copy::RunProgress;
pub use dupgen_ledger::{NamingMode, ResumeLedger, TaskId};
pub use error::{PlanError, RunError};
pub use plan::{CopyTask, SourceFile, TaskIter, TaskPlan, plan};
pub use pool::{
    PoolContext, PoolReport, SkipReason, TaskFailure, TaskResult, execute_task, run_tasks,
};
pub use run::{Orchestrator, RunOutcome, RunState, RunSummary};
