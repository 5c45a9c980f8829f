//! Chunked zip packaging of a finished output tree.
//!
//! Files under the output root are sorted by relative path and split into
//! chunks of at most `chunk_size` members. Chunk `n` is written to
//! `<output>_part<n>.zip` beside the output directory. Membership depends only
//! on the tree and the chunk size, so repackaging the same tree produces the
//! same chunks.
//!
//! Each chunk is written independently; a failed chunk does not stop the
//! others.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod chunk;
mod error;
mod writer;

pub use chunk::{ArchiveChunk, archive_path, collect_members, plan_chunks};
pub use error::ArchiveError;
pub use writer::{PackagingReport, package_output, write_chunk};
