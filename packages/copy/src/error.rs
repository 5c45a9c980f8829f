//! Error types for copy operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

/// Errors that can occur during copy operations.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Failed to create target directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to copy a file.
    #[error("Failed to copy {} to {}: {io_error}", source_path.display(), target_path.display())]
    FileCopyError {
        /// Source file path.
        source_path: PathBuf,
        /// Target file path.
        target_path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to get file metadata.
    #[error("Failed to get metadata for {}: {io_error}", path.display())]
    MetadataError {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The written target does not match the source size.
    #[error("Size mismatch for {}: expected {expected} bytes, found {actual}", path.display())]
    SizeMismatch {
        /// The target path.
        path: PathBuf,
        /// Source size in bytes.
        expected: u64,
        /// Target size in bytes.
        actual: u64,
    },
}

impl CopyError {
    /// The underlying IO error kind, if there is one.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::CreateDirError { io_error, .. }
            | Self::FileCopyError { io_error, .. }
            | Self::MetadataError { io_error, .. } => Some(io_error.kind()),
            Self::SizeMismatch { .. } => None,
        }
    }
}
