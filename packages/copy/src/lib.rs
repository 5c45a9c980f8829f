//! Single-file duplication with progress tracking.
//!
//! This crate provides the primitive the dupgen worker pool is built on:
//!
//! * Copy-on-write duplication via `reflink-copy` (APFS, Btrfs, `ReFS`),
//!   falling back to a full byte copy
//! * Idempotent parent directory creation, safe under concurrent workers
//! * Size-based verification of an existing target
//! * Lock-free progress counters for UI integration
//!
//! # Example
//!
//! ```rust,ignore
//! use dupgen_copy::{copy_file, ProgressTracker};
//!
//! let tracker = ProgressTracker::new(total);
//! let bytes = copy_file(source, target)?;
//! tracker.record_success();
//! println!("{}/{} done", tracker.completed(), tracker.total());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod copy;
mod error;
mod progress;

pub use copy::{copy_file, ensure_dir, target_matches};
pub use error::CopyError;
pub use progress::{ProgressTracker, RunProgress};
