//! TOML job file loader.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::DuplicationJob;

/// Load a TOML job file.
///
/// Relative `sources` and `outputDir` entries are kept as written; callers
/// resolve them against whatever base directory makes sense.
///
/// # Arguments
///
/// * `path` - Path to the TOML job file
///
/// # Errors
///
/// * If the file cannot be read
/// * If the file cannot be parsed as TOML
pub fn load_job_file(path: &Path) -> Result<DuplicationJob, ConfigError> {
    log::debug!("Loading TOML job from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let job: DuplicationJob =
        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    log::debug!(
        "Loaded job: {} source(s) -> {}",
        job.sources.len(),
        job.output_dir.display()
    );

    Ok(job)
}
