//! Error types for the resume ledger.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur reading or writing the ledger.
///
/// None of these are fatal to a run.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to read the ledger file.
    #[error("Failed to read resume state {}: {source}", path.display())]
    Read {
        /// Ledger path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The ledger file is not valid ledger JSON.
    #[error("Failed to parse resume state {}: {source}", path.display())]
    Parse {
        /// Ledger path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the ledger.
    #[error("Failed to serialize resume state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to write or replace the ledger file.
    #[error("Failed to write resume state {}: {source}", path.display())]
    Write {
        /// Path being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
