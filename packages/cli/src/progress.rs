//! Progress bar rendering for the CLI.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

use dupgen_engine::RunProgress;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders engine progress counters as a single bar.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager.
    ///
    /// If progress is disabled, every update goes to a hidden bar.
    #[must_use]
    pub fn new(enabled: bool, total: u64) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  Copying [{bar:30.green/dim}] {pos}/{len} files {msg}")
        {
            bar.set_style(style.progress_chars("━━─"));
        }
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar }
    }

    /// Apply a progress snapshot from the engine.
    pub fn update(&self, progress: &RunProgress) {
        self.bar.set_length(progress.total);
        self.bar.set_position(progress.completed);
        self.bar.set_message(format_rate(progress));
    }

    /// Clear the bar (for clean output after completion).
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Format rate and ETA as `"(123.4 files/s, ETA 1m 05s)"`.
#[must_use]
pub fn format_rate(progress: &RunProgress) -> String {
    let rate = progress.rate();
    progress.eta().map_or_else(
        || format!("({rate:.1} files/s)"),
        |eta| format!("({rate:.1} files/s, ETA {})", format_duration(eta)),
    )
}

/// Format a duration as `1h 02m 03s`, `2m 03s` or `3s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
