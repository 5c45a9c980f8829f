//! Path planning - map `(source, copy)` pairs to concrete target paths.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dupgen_config::DuplicationJob;
use dupgen_ledger::{NamingMode, TaskId};

use crate::error::PlanError;

/// A resolved source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// 0-based index in the job's source list.
    pub index: usize,
    /// Path as given in the job.
    pub path: PathBuf,
    /// File name without its final extension.
    pub stem: String,
    /// Final extension including the dot, or empty.
    pub extension: String,
    /// Size in bytes at planning time.
    pub len: u64,
}

impl SourceFile {
    /// Open and inspect a source file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened or its metadata read
    /// * If the path has no file name
    pub fn resolve(index: usize, path: &Path) -> Result<Self, PlanError> {
        let unreadable = |e| PlanError::SourceUnreadable {
            path: path.to_path_buf(),
            source: e,
        };

        // Opening proves readability, not just existence
        let file = File::open(path).map_err(unreadable)?;
        let len = file.metadata().map_err(unreadable)?.len();

        let stem = path
            .file_stem()
            .ok_or_else(|| PlanError::SourceWithoutName(path.to_path_buf()))?
            .to_string_lossy()
            .to_string();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Ok(Self {
            index,
            path: path.to_path_buf(),
            stem,
            extension,
            len,
        })
    }
}

/// One unit of work: duplicate `source` to `target`.
#[derive(Debug, Clone)]
pub struct CopyTask {
    /// Stable identity, used as the resume key.
    pub id: TaskId,
    /// The source being duplicated.
    pub source: Arc<SourceFile>,
    /// Fully resolved target path.
    pub target: PathBuf,
}

/// The planned task set for a job.
#[derive(Debug, Clone)]
pub struct TaskPlan {
    sources: Vec<Arc<SourceFile>>,
    copies_per_source: u64,
    output_dir: PathBuf,
    per_subfolder: u64,
    naming: NamingMode,
}

/// Plan a job.
///
/// Every source is opened up front so an unreadable source aborts the job
/// before any worker starts.
///
/// # Errors
///
/// * If a source cannot be read
/// * If two sources would produce the same target paths
pub fn plan(job: &DuplicationJob) -> Result<TaskPlan, PlanError> {
    let naming = NamingMode::from_randomize(job.randomize);

    let sources = job
        .sources
        .iter()
        .enumerate()
        .map(|(index, path)| SourceFile::resolve(index, path).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = TaskPlan {
        sources,
        copies_per_source: job.copies_per_source,
        output_dir: job.output_dir.clone(),
        per_subfolder: job.per_subfolder,
        naming,
    };

    if naming == NamingMode::Sequential {
        plan.check_sequential_collisions()?;
    }

    log::debug!(
        "Planned {} task(s) from {} source(s), {} names, {}",
        plan.total_tasks(),
        plan.sources.len(),
        naming,
        if plan.per_subfolder > 0 {
            format!("{} per subfolder", plan.per_subfolder)
        } else {
            "flat".to_string()
        }
    );

    Ok(plan)
}

impl TaskPlan {
    /// Sequential names only depend on stem and extension, so two sources
    /// sharing both would write the same files.
    fn check_sequential_collisions(&self) -> Result<(), PlanError> {
        if self.copies_per_source == 0 {
            return Ok(());
        }

        let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
        for source in &self.sources {
            let key = (source.stem.as_str(), source.extension.as_str());
            if let Some(&first) = seen.get(&key) {
                return Err(PlanError::TargetCollision {
                    target: self.target_dir(0).join(sequential_name(source, 0)),
                    first: TaskId::new(first, 0),
                    second: TaskId::new(source.index, 0),
                });
            }
            seen.insert(key, source.index);
        }

        Ok(())
    }

    /// Resolved sources, in job order.
    #[must_use]
    pub fn sources(&self) -> &[Arc<SourceFile>] {
        &self.sources
    }

    /// Naming mode used for target file names.
    #[must_use]
    pub const fn naming(&self) -> NamingMode {
        self.naming
    }

    /// Number of tasks the plan yields.
    #[must_use]
    pub fn total_tasks(&self) -> u64 {
        (self.sources.len() as u64).saturating_mul(self.copies_per_source)
    }

    /// Bytes a full run would write.
    #[must_use]
    pub fn estimated_bytes(&self) -> u64 {
        self.sources
            .iter()
            .map(|s| s.len.saturating_mul(self.copies_per_source))
            .fold(0, u64::saturating_add)
    }

    /// Subfolder name for a copy index, if subfolders are enabled.
    ///
    /// Copy indices `0..per_subfolder` land in `part_1`, the next
    /// `per_subfolder` in `part_2`, and so on.
    #[must_use]
    pub fn subfolder(&self, copy: u64) -> Option<String> {
        (self.per_subfolder > 0).then(|| format!("part_{}", copy / self.per_subfolder + 1))
    }

    /// Directory a copy index lands in.
    #[must_use]
    pub fn target_dir(&self, copy: u64) -> PathBuf {
        match self.subfolder(copy) {
            Some(sub) => self.output_dir.join(sub),
            None => self.output_dir.clone(),
        }
    }

    /// Lazily iterate every task.
    ///
    /// Each call starts from the beginning. Sequential names are identical
    /// across calls; randomized names are freshly generated.
    #[must_use]
    pub fn tasks(&self) -> TaskIter<'_> {
        TaskIter {
            plan: self,
            source: 0,
            copy: 0,
            remaining: self.total_tasks(),
            issued_tokens: HashSet::new(),
        }
    }
}

fn sequential_name(source: &SourceFile, copy: u64) -> String {
    format!("{}_{}{}", source.stem, copy + 1, source.extension)
}

/// Lazy task sequence over a [`TaskPlan`].
#[derive(Debug)]
pub struct TaskIter<'a> {
    plan: &'a TaskPlan,
    source: usize,
    copy: u64,
    remaining: u64,
    issued_tokens: HashSet<String>,
}

impl TaskIter<'_> {
    fn unique_token(&mut self) -> String {
        loop {
            let token = uuid::Uuid::new_v4().simple().to_string();
            if self.issued_tokens.insert(token.clone()) {
                return token;
            }
            log::debug!("Random token collision on {token}; regenerating");
        }
    }

    fn file_name(&mut self, source: &SourceFile, copy: u64) -> String {
        match self.plan.naming {
            NamingMode::Sequential => sequential_name(source, copy),
            NamingMode::Randomized => {
                let token = self.unique_token();
                format!("{}_{token}{}", source.stem, source.extension)
            }
        }
    }
}

impl Iterator for TaskIter<'_> {
    type Item = CopyTask;

    fn next(&mut self) -> Option<Self::Item> {
        while self.source < self.plan.sources.len() {
            if self.copy < self.plan.copies_per_source {
                let source = Arc::clone(&self.plan.sources[self.source]);
                let copy = self.copy;
                self.copy += 1;
                self.remaining = self.remaining.saturating_sub(1);

                let name = self.file_name(&source, copy);
                return Some(CopyTask {
                    id: TaskId::new(source.index, copy),
                    target: self.plan.target_dir(copy).join(name),
                    source,
                });
            }
            self.source += 1;
            self.copy = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "payload").unwrap();
        path
    }

    #[test]
    fn test_sequential_names_and_ids() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "report.pdf");
        let out = dir.path().join("out");
        let job = DuplicationJob::new(vec![source], 3, out.clone());

        let plan = plan(&job).unwrap();
        let tasks: Vec<CopyTask> = plan.tasks().collect();

        assert_eq!(plan.total_tasks(), 3);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id, TaskId::new(0, 0));
        assert_eq!(tasks[0].target, out.join("report_1.pdf"));
        assert_eq!(tasks[2].id, TaskId::new(0, 2));
        assert_eq!(tasks[2].target, out.join("report_3.pdf"));
    }

    #[test]
    fn test_sources_iterate_in_order() {
        let dir = TempDir::new().unwrap();
        let a = write_source(&dir, "a.txt");
        let b = write_source(&dir, "b");
        let job = DuplicationJob::new(vec![a, b], 2, dir.path().join("out"));

        let plan = plan(&job).unwrap();
        let ids: Vec<TaskId> = plan.tasks().map(|t| t.id).collect();
        let names: Vec<String> = plan
            .tasks()
            .map(|t| t.target.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            ids,
            vec![
                TaskId::new(0, 0),
                TaskId::new(0, 1),
                TaskId::new(1, 0),
                TaskId::new(1, 1),
            ]
        );
        assert_eq!(names, vec!["a_1.txt", "a_2.txt", "b_1", "b_2"]);
    }

    #[test]
    fn test_subfolder_bucketing() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "seed.txt");
        let out = dir.path().join("out");
        let mut job = DuplicationJob::new(vec![source], 10_000, out.clone());
        job.per_subfolder = 5000;

        let plan = plan(&job).unwrap();

        assert_eq!(plan.subfolder(0).as_deref(), Some("part_1"));
        assert_eq!(plan.subfolder(4999).as_deref(), Some("part_1"));
        assert_eq!(plan.subfolder(5000).as_deref(), Some("part_2"));
        assert_eq!(plan.subfolder(9999).as_deref(), Some("part_2"));

        let tasks: Vec<CopyTask> = plan.tasks().collect();
        assert_eq!(tasks[4999].target, out.join("part_1/seed_5000.txt"));
        assert_eq!(tasks[5000].target, out.join("part_2/seed_5001.txt"));
    }

    #[test]
    fn test_flat_output_has_no_subfolder() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "seed.txt");
        let out = dir.path().join("out");
        let job = DuplicationJob::new(vec![source], 1, out.clone());

        let plan = plan(&job).unwrap();

        assert_eq!(plan.subfolder(0), None);
        assert_eq!(plan.tasks().next().unwrap().target.parent(), Some(out.as_path()));
    }

    #[test]
    fn test_sequential_plan_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "seed.txt");
        let mut job = DuplicationJob::new(vec![source], 25, dir.path().join("out"));
        job.per_subfolder = 7;

        let plan = plan(&job).unwrap();
        let first: Vec<PathBuf> = plan.tasks().map(|t| t.target).collect();
        let second: Vec<PathBuf> = plan.tasks().map(|t| t.target).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_randomized_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "seed.txt");
        let mut job = DuplicationJob::new(vec![source], 500, dir.path().join("out"));
        job.randomize = true;

        let plan = plan(&job).unwrap();
        let targets: HashSet<PathBuf> = plan.tasks().map(|t| t.target).collect();

        assert_eq!(targets.len(), 500);
        for target in &targets {
            let name = target.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("seed_"));
            assert!(name.ends_with(".txt"));
        }
    }

    #[test]
    fn test_sequential_collision_fails_fast() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("x/seed.txt"), "1").unwrap();
        fs::write(dir.path().join("y/seed.txt"), "2").unwrap();
        let job = DuplicationJob::new(
            vec![dir.path().join("x/seed.txt"), dir.path().join("y/seed.txt")],
            2,
            dir.path().join("out"),
        );

        let err = plan(&job).unwrap_err();
        assert!(matches!(
            err,
            PlanError::TargetCollision { first, second, .. }
                if first == TaskId::new(0, 0) && second == TaskId::new(1, 0)
        ));
    }

    #[test]
    fn test_same_stem_allowed_when_randomized() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("x/seed.txt"), "1").unwrap();
        fs::write(dir.path().join("y/seed.txt"), "2").unwrap();
        let mut job = DuplicationJob::new(
            vec![dir.path().join("x/seed.txt"), dir.path().join("y/seed.txt")],
            2,
            dir.path().join("out"),
        );
        job.randomize = true;

        assert!(plan(&job).is_ok());
    }

    #[test]
    fn test_missing_source_fails_planning() {
        let dir = TempDir::new().unwrap();
        let job = DuplicationJob::new(vec![dir.path().join("gone.bin")], 1, dir.path().join("out"));

        assert!(matches!(
            plan(&job),
            Err(PlanError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn test_estimates_and_size_hint() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, "seed.txt");
        let job = DuplicationJob::new(vec![source], 4, dir.path().join("out"));

        let plan = plan(&job).unwrap();
        let mut tasks = plan.tasks();

        assert_eq!(plan.estimated_bytes(), 4 * 7);
        assert_eq!(tasks.size_hint(), (4, Some(4)));
        tasks.next();
        assert_eq!(tasks.size_hint(), (3, Some(3)));
    }
}
