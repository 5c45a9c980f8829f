//! Chunk membership planning.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use dupgen_ledger::{RESUME_FILE, RESUME_TMP_FILE};

use crate::error::ArchiveError;

/// An ordered group of output files packaged into one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveChunk {
    /// 1-based chunk number.
    pub index: usize,
    /// Member paths relative to the output root, in archive order.
    pub members: Vec<PathBuf>,
}

/// Collect every regular file under `output_dir`, relative and sorted.
///
/// The resume ledger is bookkeeping, not output, and is left out.
///
/// # Errors
///
/// * If the directory cannot be traversed
pub fn collect_members(output_dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut members = Vec::new();

    for entry in jwalk::WalkDir::new(output_dir)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false)
    {
        let entry = entry.map_err(|e| ArchiveError::EnumerationError {
            path: output_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel_path = path
            .strip_prefix(output_dir)
            .map_err(|_| ArchiveError::EnumerationError {
                path: path.clone(),
                message: "Failed to strip prefix".to_string(),
            })?;

        if rel_path == Path::new(RESUME_FILE) || rel_path == Path::new(RESUME_TMP_FILE) {
            continue;
        }

        members.push(rel_path.to_path_buf());
    }

    members.sort();
    log::debug!(
        "Collected {} archive member(s) under {}",
        members.len(),
        output_dir.display()
    );

    Ok(members)
}

/// Split sorted members into chunks of at most `chunk_size`.
///
/// A `chunk_size` of 0 is treated as 1.
#[must_use]
pub fn plan_chunks(members: Vec<PathBuf>, chunk_size: usize) -> Vec<ArchiveChunk> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(members.len().div_ceil(chunk_size));
    let mut members = members.into_iter().peekable();
    let mut index = 0;

    while members.peek().is_some() {
        index += 1;
        chunks.push(ArchiveChunk {
            index,
            members: members.by_ref().take(chunk_size).collect(),
        });
    }

    chunks
}

/// Path of chunk `index` for `output_dir`: `<parent>/<name>_part<index>.zip`.
///
/// # Errors
///
/// * If `output_dir` has no file name or parent
pub fn archive_path(output_dir: &Path, index: usize) -> Result<PathBuf, ArchiveError> {
    let invalid = || ArchiveError::InvalidOutputDir(output_dir.to_path_buf());
    let name = output_dir.file_name().ok_or_else(invalid)?;
    let parent = output_dir.parent().ok_or_else(invalid)?;

    Ok(parent.join(format!("{}_part{index}.zip", name.to_string_lossy())))
}
