//! Job configuration for dupgen.
//!
//! This crate defines the fully-resolved [`DuplicationJob`] that front-ends hand
//! to the duplication engine, along with its up-front validation rules.
//!
//! # Supported Job Sources
//!
//! * Built directly in code (CLI flags, interactive prompts)
//! * TOML job files (`dupgen.job.toml`) via [`load_job_file`]
//!
//! # Example
//!
//! ```rust,ignore
//! use dupgen_config::{DuplicationJob, load_job_file};
//!
//! let job = load_job_file(Path::new("dupgen.job.toml"))?;
//! job.validate()?;
//! println!("{} files planned", job.total_files());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod toml_loader;
mod types;

pub use error::{ConfigError, ValidationError};
pub use toml_loader::load_job_file;
pub use types::{
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LIMIT, DEFAULT_WORKERS,
    DuplicationJob, MAX_WORKERS,
};
