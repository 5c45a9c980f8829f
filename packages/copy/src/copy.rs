//! Single-file duplication.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::CopyError;

/// Create a directory and its parents.
///
/// A directory that already exists, including one created concurrently by
/// another worker, is not an error.
///
/// # Errors
///
/// * If the directory cannot be created
pub fn ensure_dir(path: &Path) -> Result<(), CopyError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(e) => Err(CopyError::CreateDirError {
            path: path.to_path_buf(),
            io_error: e,
        }),
    }
}

/// Duplicate `source` to `target`, overwriting any existing target.
///
/// Creates the target's parent directory as needed. Returns the number of
/// bytes in the produced file.
///
/// # Arguments
///
/// * `source` - Source file path
/// * `target` - Target file path
///
/// # Errors
///
/// * If the parent directory cannot be created
/// * If the copy operation fails
/// * If the produced file's size differs from the source
/// * If the source's modification time cannot be applied to the target
pub fn copy_file(source: &Path, target: &Path) -> Result<u64, CopyError> {
    log::trace!("Copying file: {} -> {}", source.display(), target.display());

    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }

    let source_meta = metadata(source)?;
    let expected = source_meta.len();

    copy_file_with_reflink(source, target)?;

    let actual = metadata(target)?.len();
    if actual != expected {
        return Err(CopyError::SizeMismatch {
            path: target.to_path_buf(),
            expected,
            actual,
        });
    }

    if let Ok(modified) = source_meta.modified() {
        preserve_mtime(target, modified)?;
    }

    Ok(actual)
}

/// Whether `target` exists as a regular file of exactly `expected_len` bytes.
#[must_use]
pub fn target_matches(target: &Path, expected_len: u64) -> bool {
    fs::metadata(target).is_ok_and(|m| m.is_file() && m.len() == expected_len)
}

fn metadata(path: &Path) -> Result<fs::Metadata, CopyError> {
    fs::metadata(path).map_err(|e| CopyError::MetadataError {
        path: path.to_path_buf(),
        io_error: e,
    })
}

/// Give `target` the source's modification time.
fn preserve_mtime(target: &Path, modified: SystemTime) -> Result<(), CopyError> {
    // Read-only copies of read-only sources can still take new times on unix
    fs::OpenOptions::new()
        .write(true)
        .open(target)
        .or_else(|_| fs::File::open(target))
        .and_then(|file| file.set_modified(modified))
        .map_err(|e| CopyError::MetadataError {
            path: target.to_path_buf(),
            io_error: e,
        })
}

/// Copy a single file, trying reflink first then falling back to regular copy.
fn copy_file_with_reflink(source: &Path, target: &Path) -> Result<(), CopyError> {
    // Reflink refuses existing targets; the fallback overwrites them
    match reflink_copy::reflink(source, target) {
        Ok(()) => {
            log::trace!("Reflinked {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(_) => {
            fs::copy(source, target).map_err(|e| CopyError::FileCopyError {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                io_error: e,
            })?;
            log::trace!("Copied {} -> {}", source.display(), target.display());
            Ok(())
        }
    }
}
