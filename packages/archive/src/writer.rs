//! Zip chunk writing.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::chunk::{ArchiveChunk, archive_path, collect_members, plan_chunks};
use crate::error::ArchiveError;

/// Outcome of packaging an output tree.
#[derive(Debug, Default)]
pub struct PackagingReport {
    /// Number of files found in the output tree.
    pub members: usize,
    /// Archives written successfully, in chunk order.
    pub written: Vec<PathBuf>,
    /// Chunks that failed, by 1-based chunk index.
    pub failed: Vec<(usize, ArchiveError)>,
}

impl PackagingReport {
    /// Total number of chunks attempted.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Indices of the chunks that failed.
    #[must_use]
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failed.iter().map(|(index, _)| *index).collect()
    }

    /// Whether every chunk was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Package every file under `output_dir` into zip chunks of `chunk_size`.
///
/// Chunks are written in parallel. Failure of one chunk is recorded in the
/// report and does not stop the others.
///
/// # Errors
///
/// * If the output tree cannot be enumerated
/// * If archive names cannot be derived from `output_dir`
pub fn package_output(
    output_dir: &Path,
    chunk_size: usize,
) -> Result<PackagingReport, ArchiveError> {
    // Surface a bad output name once, not per chunk
    archive_path(output_dir, 1)?;

    let members = collect_members(output_dir)?;
    let member_count = members.len();
    let chunks = plan_chunks(members, chunk_size);

    log::info!(
        "Packaging {member_count} file(s) into {} chunk(s) of up to {chunk_size}",
        chunks.len()
    );

    let results: Vec<(usize, Result<PathBuf, ArchiveError>)> = chunks
        .par_iter()
        .map(|chunk| (chunk.index, write_chunk(output_dir, chunk)))
        .collect();

    let mut report = PackagingReport {
        members: member_count,
        ..PackagingReport::default()
    };

    for (index, result) in results {
        match result {
            Ok(path) => report.written.push(path),
            Err(e) => {
                log::warn!("Archive chunk {index} failed: {e}");
                report.failed.push((index, e));
            }
        }
    }

    Ok(report)
}

/// Write one chunk to `<output>_part<index>.zip`.
///
/// The archive is assembled in a scratch file and renamed into place, so a
/// failed chunk never leaves a truncated zip under the final name.
///
/// # Errors
///
/// * If a member cannot be read
/// * If the archive cannot be written or renamed into place
pub fn write_chunk(output_dir: &Path, chunk: &ArchiveChunk) -> Result<PathBuf, ArchiveError> {
    let final_path = archive_path(output_dir, chunk.index)?;
    let tmp_path = final_path.with_extension("zip.tmp");

    let result = write_zip(output_dir, chunk, &tmp_path)
        .and_then(|()| fs::rename(&tmp_path, &final_path).map_err(io_error(&final_path)));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    log::debug!(
        "Wrote {} ({} member(s))",
        final_path.display(),
        chunk.members.len()
    );

    Ok(final_path)
}

fn write_zip(output_dir: &Path, chunk: &ArchiveChunk, path: &Path) -> Result<(), ArchiveError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    // Fixed timestamp keeps repeated packaging of the same tree identical
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for member in &chunk.members {
        let source_path = output_dir.join(member);
        let mut source = File::open(&source_path).map_err(io_error(&source_path))?;
        let len = source
            .metadata()
            .map_err(io_error(&source_path))?
            .len();

        zip.start_file(
            entry_name(member),
            options.large_file(len >= u64::from(u32::MAX)),
        )
        .map_err(zip_error(path))?;
        io::copy(&mut source, &mut zip).map_err(io_error(&source_path))?;
    }

    let mut writer = zip.finish().map_err(zip_error(path))?;
    writer.flush().map_err(io_error(path))?;

    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError {
    let path = path.to_path_buf();
    move |source| ArchiveError::IoError { path, source }
}

fn zip_error(path: &Path) -> impl FnOnce(zip::result::ZipError) -> ArchiveError {
    let path = path.to_path_buf();
    move |source| ArchiveError::ZipError { path, source }
}

/// Zip entry name for a relative path, always `/`-separated.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
