//! Progress tracking for duplication runs.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Raw progress counters handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    /// Tasks finished so far (succeeded, skipped or failed).
    pub completed: u64,
    /// Total planned tasks.
    pub total: u64,
    /// Time since execution started.
    pub elapsed: Duration,
}

impl RunProgress {
    /// Create a new progress report.
    #[must_use]
    pub const fn new(completed: u64, total: u64, elapsed: Duration) -> Self {
        Self {
            completed,
            total,
            elapsed,
        }
    }

    /// Calculate progress as a percentage (0.0 to 100.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Tasks per second since execution started.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.completed as f64 / secs
        }
    }

    /// Estimated time remaining at the current rate.
    ///
    /// `None` until at least one task has finished.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.rate();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed);
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

/// Thread-safe progress tracker using atomics.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    started: Instant,
    succeeded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
}

impl ProgressTracker {
    /// Create a new progress tracker for `total` tasks.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            started: Instant::now(),
            succeeded: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Record a successful task that produced `bytes` bytes.
    pub fn record_success(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a task skipped because it was already done.
    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a failed task.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Get the total number of tasks.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Get the succeeded count.
    #[must_use]
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Get the skipped count.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Get the failed count.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    /// Get the bytes produced (or estimated, in a dry run).
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    /// Tasks finished in any way.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.succeeded() + self.skipped() + self.failed()
    }

    /// Time since the tracker was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Get a progress snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RunProgress {
        RunProgress::new(self.completed(), self.total, self.elapsed())
    }
}
