//! On-disk ledger format.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ledger file name inside the output root.
pub const RESUME_FILE: &str = ".resume_state.json";

/// Scratch file the ledger is written to before being renamed into place.
pub const RESUME_TMP_FILE: &str = ".resume_state.json.tmp";

/// Current ledger format version.
pub const LEDGER_VERSION: u32 = 1;

/// Stable identity of one duplication task.
///
/// Independent of the target file name. Serialized as `[source, copy]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, u64)", into = "(usize, u64)")]
pub struct TaskId {
    /// 0-based source index.
    pub source: usize,
    /// 0-based copy index within the source.
    pub copy: u64,
}

impl TaskId {
    /// Create a task identity.
    #[must_use]
    pub const fn new(source: usize, copy: u64) -> Self {
        Self { source, copy }
    }
}

impl From<(usize, u64)> for TaskId {
    fn from((source, copy): (usize, u64)) -> Self {
        Self { source, copy }
    }
}

impl From<TaskId> for (usize, u64) {
    fn from(id: TaskId) -> Self {
        (id.source, id.copy)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.source, self.copy)
    }
}

/// How target file names are generated.
///
/// Stored in the ledger: entries recorded under one mode do not describe files
/// that exist under the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// `<stem>_<n><ext>`.
    Sequential,
    /// `<stem>_<token><ext>`.
    Randomized,
}

impl NamingMode {
    /// Naming mode for a `randomize` flag.
    #[must_use]
    pub const fn from_randomize(randomize: bool) -> Self {
        if randomize {
            Self::Randomized
        } else {
            Self::Sequential
        }
    }
}

impl std::fmt::Display for NamingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Randomized => write!(f, "randomized"),
        }
    }
}

/// Serialized ledger document. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LedgerFile {
    pub version: u32,
    pub naming: NamingMode,
    #[serde(default)]
    pub completed: BTreeSet<TaskId>,
}

/// Borrowed view of a [`LedgerFile`] for writing.
#[derive(Debug, Serialize)]
pub(crate) struct LedgerFileRef<'a> {
    pub version: u32,
    pub naming: NamingMode,
    pub completed: &'a BTreeSet<TaskId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_serializes_as_pair() {
        let json = serde_json::to_string(&TaskId::new(2, 41)).unwrap();
        assert_eq!(json, "[2,41]");
    }

    #[test]
    fn test_ledger_file_ignores_unknown_fields() {
        let json = r#"{
            "version": 1,
            "naming": "sequential",
            "completed": [[0, 0], [1, 3]],
            "writtenBy": "some future version"
        }"#;

        let file: LedgerFile = serde_json::from_str(json).unwrap();

        assert_eq!(file.naming, NamingMode::Sequential);
        assert_eq!(file.completed.len(), 2);
        assert!(file.completed.contains(&TaskId::new(1, 3)));
    }

    #[test]
    fn test_borrowed_file_reads_back() {
        let completed: BTreeSet<TaskId> = [TaskId::new(0, 2), TaskId::new(3, 1)].into();
        let json = serde_json::to_string(&LedgerFileRef {
            version: LEDGER_VERSION,
            naming: NamingMode::Randomized,
            completed: &completed,
        })
        .unwrap();

        let file: LedgerFile = serde_json::from_str(&json).unwrap();

        assert_eq!(file.naming, NamingMode::Randomized);
        assert_eq!(file.completed, completed);
    }

    #[test]
    fn test_task_id_ordering() {
        assert!(TaskId::new(0, 9) < TaskId::new(1, 0));
        assert!(TaskId::new(1, 0) < TaskId::new(1, 1));
    }
}
