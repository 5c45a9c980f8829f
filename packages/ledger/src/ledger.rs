//! The resume ledger.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::LedgerError;
use crate::state::{
    LEDGER_VERSION, LedgerFile, LedgerFileRef, NamingMode, RESUME_FILE, RESUME_TMP_FILE, TaskId,
};

#[derive(Debug, Default)]
struct Inner {
    completed: BTreeSet<TaskId>,
    pending: u64,
}

/// Durable record of completed tasks.
///
/// All mutation goes through one mutex, so any number of workers may call
/// [`record`](Self::record) concurrently.
#[derive(Debug)]
pub struct ResumeLedger {
    path: PathBuf,
    tmp_path: PathBuf,
    naming: NamingMode,
    checkpoint_interval: u64,
    inner: Mutex<Inner>,
}

impl ResumeLedger {
    /// Start an empty ledger for `output_dir`, ignoring any existing file.
    ///
    /// `checkpoint_interval` is the number of new records between automatic
    /// flushes (0 disables checkpointing).
    #[must_use]
    pub fn fresh(output_dir: &Path, naming: NamingMode, checkpoint_interval: u64) -> Self {
        Self {
            path: output_dir.join(RESUME_FILE),
            tmp_path: output_dir.join(RESUME_TMP_FILE),
            naming,
            checkpoint_interval,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Load the ledger for `output_dir`.
    ///
    /// Never fails: a missing file yields an empty ledger, and an unreadable or
    /// malformed file, or one recorded under a different naming mode, yields
    /// an empty ledger with a warning.
    #[must_use]
    pub fn load(output_dir: &Path, naming: NamingMode, checkpoint_interval: u64) -> Self {
        let ledger = Self::fresh(output_dir, naming, checkpoint_interval);

        match ledger.read_existing() {
            Ok(Some(completed)) => {
                log::info!(
                    "Loaded resume state: {} completed task(s) from {}",
                    completed.len(),
                    ledger.path.display()
                );
                ledger.lock().completed = completed;
            }
            Ok(None) => {
                log::debug!("No resume state at {}", ledger.path.display());
            }
            Err(e) => {
                log::warn!("{e}; starting with no prior progress");
            }
        }

        ledger
    }

    fn read_existing(&self) -> Result<Option<BTreeSet<TaskId>>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let file: LedgerFile =
            serde_json::from_str(&content).map_err(|e| LedgerError::Parse {
                path: self.path.clone(),
                source: e,
            })?;

        if file.naming != self.naming {
            log::warn!(
                "Resume state at {} was recorded with {} names but this run uses {} names; ignoring it",
                self.path.display(),
                file.naming,
                self.naming
            );
            return Ok(None);
        }

        if file.version > LEDGER_VERSION {
            log::debug!(
                "Resume state version {} is newer than {LEDGER_VERSION}; reading known fields",
                file.version
            );
        }

        Ok(Some(file.completed))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The set stays consistent even if a holder panicked mid-insert
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Path of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Naming mode the ledger is recorded under.
    #[must_use]
    pub const fn naming(&self) -> NamingMode {
        self.naming
    }

    /// Snapshot of the completed set.
    ///
    /// The snapshot never changes, so workers can share it without locking.
    #[must_use]
    pub fn completed(&self) -> HashSet<TaskId> {
        self.lock().completed.iter().copied().collect()
    }

    /// Whether `id` has been recorded.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.lock().completed.contains(&id)
    }

    /// Number of recorded tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().completed.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a fully written task.
    ///
    /// Idempotent. Returns `true` when `id` was not already recorded. Every
    /// `checkpoint_interval` new records the ledger is flushed to disk; a
    /// failed checkpoint is logged and retried at the next one.
    pub fn record(&self, id: TaskId) -> bool {
        let mut inner = self.lock();

        if !inner.completed.insert(id) {
            return false;
        }

        inner.pending += 1;
        if self.checkpoint_interval > 0 && inner.pending >= self.checkpoint_interval {
            match self.write(&inner.completed) {
                Ok(()) => {
                    log::debug!("Checkpointed {} task(s)", inner.completed.len());
                    inner.pending = 0;
                }
                Err(e) => log::warn!("Checkpoint failed: {e}"),
            }
        }

        true
    }

    /// Write the current completed set to disk.
    ///
    /// Safe to call repeatedly. The file is replaced atomically.
    ///
    /// # Errors
    ///
    /// * If the ledger cannot be serialized
    /// * If the scratch file cannot be written or renamed into place
    pub fn persist(&self) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        self.write(&inner.completed)?;
        inner.pending = 0;
        log::debug!(
            "Persisted {} task(s) to {}",
            inner.completed.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write(&self, completed: &BTreeSet<TaskId>) -> Result<(), LedgerError> {
        let file = LedgerFileRef {
            version: LEDGER_VERSION,
            naming: self.naming,
            completed,
        };
        let json = serde_json::to_vec(&file).map_err(LedgerError::Serialize)?;

        fs::write(&self.tmp_path, json).map_err(|e| LedgerError::Write {
            path: self.tmp_path.clone(),
            source: e,
        })?;

        fs::rename(&self.tmp_path, &self.path).map_err(|e| LedgerError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);

        assert!(ledger.is_empty());
        assert!(ledger.completed().is_empty());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::fresh(dir.path(), NamingMode::Sequential, 0);

        assert!(ledger.record(TaskId::new(0, 0)));
        assert!(ledger.record(TaskId::new(1, 4)));
        ledger.persist().unwrap();

        let reloaded = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(TaskId::new(1, 4)));
        assert!(!dir.path().join(RESUME_TMP_FILE).exists());
    }

    #[test]
    fn test_record_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::fresh(dir.path(), NamingMode::Sequential, 0);

        assert!(ledger.record(TaskId::new(0, 1)));
        assert!(!ledger.record(TaskId::new(0, 1)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_corrupt_ledger_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RESUME_FILE), "{\"version\": 1, \"compl").unwrap();

        let ledger = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_legacy_array_ledger_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(RESUME_FILE),
            r#"["seed_1.txt", "seed_2.txt"]"#,
        )
        .unwrap();

        let ledger = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_naming_mismatch_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::fresh(dir.path(), NamingMode::Randomized, 0);
        ledger.record(TaskId::new(0, 0));
        ledger.persist().unwrap();

        let reloaded = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert!(reloaded.is_empty());

        let same_mode = ResumeLedger::load(dir.path(), NamingMode::Randomized, 0);
        assert_eq!(same_mode.len(), 1);
    }

    #[test]
    fn test_checkpoint_flushes_periodically() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::fresh(dir.path(), NamingMode::Sequential, 3);

        ledger.record(TaskId::new(0, 0));
        ledger.record(TaskId::new(0, 1));
        assert!(!dir.path().join(RESUME_FILE).exists());

        ledger.record(TaskId::new(0, 2));
        assert!(dir.path().join(RESUME_FILE).exists());

        let on_disk = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert_eq!(on_disk.len(), 3);
    }

    #[test]
    fn test_concurrent_records() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(ResumeLedger::fresh(dir.path(), NamingMode::Sequential, 7));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for copy in 0..100 {
                        ledger.record(TaskId::new(worker, copy));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        ledger.persist().unwrap();
        let reloaded = ResumeLedger::load(dir.path(), NamingMode::Sequential, 0);
        assert_eq!(reloaded.len(), 800);
    }

    #[test]
    fn test_persist_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let ledger =
            ResumeLedger::fresh(&dir.path().join("missing"), NamingMode::Sequential, 0);
        ledger.record(TaskId::new(0, 0));

        assert!(matches!(ledger.persist(), Err(LedgerError::Write { .. })));
    }
}
