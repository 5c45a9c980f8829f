//! Error types for archive packaging.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while packaging.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Enumerating the output tree failed.
    #[error("Failed to enumerate {}: {message}", path.display())]
    EnumerationError {
        /// The directory path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The output directory has no usable name or parent.
    #[error("Cannot derive archive names from output directory {}", .0.display())]
    InvalidOutputDir(PathBuf),

    /// IO error while writing an archive.
    #[error("IO error at {}: {source}", path.display())]
    IoError {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an entry or failed to finish.
    #[error("Zip error in {}: {source}", path.display())]
    ZipError {
        /// Archive path.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },
}
