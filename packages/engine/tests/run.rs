use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::Ordering;

use dupgen_engine::{
    DuplicationJob, NamingMode, Orchestrator, ResumeLedger, RunError, RunOutcome, TaskId, plan,
};
use tempfile::TempDir;

fn seed(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn tree(root: &Path) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.insert(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    files
}

fn run(job: DuplicationJob) -> dupgen_engine::RunSummary {
    Orchestrator::new(job).run(|_| {}).unwrap()
}

#[test]
fn counts_add_up_to_planned() {
    let dir = TempDir::new().unwrap();
    let a = seed(dir.path(), "a.txt", "alpha");
    let b = seed(dir.path(), "b.bin", "beta");
    let mut job = DuplicationJob::new(vec![a, b], 30, dir.path().join("out"));
    job.per_subfolder = 8;

    let summary = run(job);

    assert_eq!(summary.planned, 60);
    assert_eq!(
        summary.succeeded + summary.failed_count() + summary.skipped + summary.not_attempted,
        summary.planned
    );
    assert_eq!(summary.outcome(), RunOutcome::Success);
    assert_eq!(
        fs::read_to_string(dir.path().join("out/part_4/b_30.bin")).unwrap(),
        "beta"
    );
}

#[test]
fn resumed_run_writes_nothing_new() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let mut job = DuplicationJob::new(vec![source], 40, dir.path().join("out"));
    job.per_subfolder = 16;
    job.resume = true;

    let first = run(job.clone());
    let files_after_first = tree(&dir.path().join("out"));

    let second = run(job);

    assert_eq!(first.succeeded, 40);
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped, 40);
    assert_eq!(second.bytes, 0);
    assert_eq!(tree(&dir.path().join("out")), files_after_first);
}

#[test]
fn resume_picks_up_only_failed_tasks() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let out = dir.path().join("out");
    let mut job = DuplicationJob::new(vec![source], 6, out.clone());
    job.per_subfolder = 3;
    job.resume = true;

    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("part_2"), "blocker").unwrap();

    let first = run(job.clone());
    assert_eq!(first.outcome(), RunOutcome::Partial);
    assert_eq!(
        first.failed.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![TaskId::new(0, 3), TaskId::new(0, 4), TaskId::new(0, 5)]
    );

    fs::remove_file(out.join("part_2")).unwrap();
    let second = run(job);

    assert_eq!(second.outcome(), RunOutcome::Success);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.succeeded, 3);
    assert!(out.join("part_2/seed_6.txt").exists());
}

#[test]
fn safety_limit_prevents_any_work() {
    let dir = TempDir::new().unwrap();
    let a = seed(dir.path(), "a.txt", "a");
    let b = seed(dir.path(), "b.txt", "b");
    let mut job = DuplicationJob::new(vec![a, b], 26, dir.path().join("out"));
    job.max_limit = 50;

    let mut orchestrator = Orchestrator::new(job);
    let err = orchestrator.run(|_| panic!("no progress expected")).unwrap_err();

    assert!(matches!(err, RunError::Validation(_)));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unreadable_source_aborts_before_workers() {
    let dir = TempDir::new().unwrap();
    let good = seed(dir.path(), "good.txt", "ok");
    let job = DuplicationJob::new(
        vec![good, dir.path().join("missing.txt")],
        3,
        dir.path().join("out"),
    );

    let err = Orchestrator::new(job).run(|_| {}).unwrap_err();

    assert!(matches!(err, RunError::Validation(_)));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn sequential_planning_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let a = seed(dir.path(), "a.txt", "a");
    let b = seed(dir.path(), "b.txt", "b");
    let mut job = DuplicationJob::new(vec![a, b], 12, dir.path().join("out"));
    job.per_subfolder = 5;

    let first: Vec<PathBuf> = plan(&job).unwrap().tasks().map(|t| t.target).collect();
    let second: Vec<PathBuf> = plan(&job).unwrap().tasks().map(|t| t.target).collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 24);
}

#[test]
fn dry_run_creates_nothing_and_counts_like_a_real_run() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "0123456789");
    let mut job = DuplicationJob::new(vec![source], 25, dir.path().join("out"));
    job.per_subfolder = 10;
    job.archive = true;

    let mut dry = job.clone();
    dry.dry_run = true;
    let dry_summary = run(dry);

    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("out_part1.zip").exists());
    assert!(dry_summary.packaging.is_none());
    assert!(!dry_summary.ledger_persisted);

    let real_summary = run(job);

    assert_eq!(dry_summary.planned, real_summary.planned);
    assert_eq!(dry_summary.succeeded, real_summary.succeeded);
    assert_eq!(dry_summary.bytes, real_summary.bytes);
}

#[test]
fn archive_chunks_follow_chunk_size() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "s.txt", "x");
    let mut job = DuplicationJob::new(vec![source], 13_000, dir.path().join("out"));
    job.per_subfolder = 5000;
    job.archive = true;
    job.chunk_size = 5000;
    job.workers = 8;

    let summary = run(job);

    assert_eq!(summary.outcome(), RunOutcome::Success);
    assert_eq!(tree(&dir.path().join("out/part_1")).len(), 5000);
    assert_eq!(tree(&dir.path().join("out/part_3")).len(), 3000);

    let packaging = summary.packaging.unwrap();
    assert_eq!(packaging.members, 13_000);
    assert_eq!(packaging.written.len(), 3);

    let sizes: Vec<usize> = packaging
        .written
        .iter()
        .map(|p| zip_len(p))
        .collect();
    assert_eq!(sizes, vec![5000, 5000, 3000]);
}

fn zip_len(path: &Path) -> usize {
    zip::ZipArchive::new(fs::File::open(path).unwrap())
        .unwrap()
        .len()
}

#[test]
fn corrupt_ledger_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join(".resume_state.json"), "not json at all {").unwrap();

    let mut job = DuplicationJob::new(vec![source], 5, out.clone());
    job.resume = true;

    let summary = run(job);

    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.skipped, 0);
    assert!(summary.ledger_persisted);
    let ledger = fs::read_to_string(out.join(".resume_state.json")).unwrap();
    assert!(ledger.contains("\"completed\""));
}

#[test]
fn switching_naming_mode_discards_ledger() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let mut job = DuplicationJob::new(vec![source], 4, dir.path().join("out"));
    job.resume = true;

    run(job.clone());

    job.randomize = true;
    let summary = run(job);

    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(tree(&dir.path().join("out")).len(), 8 + 1);
}

#[test]
fn progress_reaches_total() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let job = DuplicationJob::new(vec![source], 50, dir.path().join("out"));
    let last = Mutex::new((0, 0));

    Orchestrator::new(job)
        .run(|p| {
            let mut last = last.lock().unwrap();
            assert!(p.completed >= last.0);
            *last = (p.completed, p.total);
        })
        .unwrap();

    assert_eq!(*last.lock().unwrap(), (50, 50));
}

#[test]
fn cancel_mid_run_records_exactly_the_written_files() {
    let dir = TempDir::new().unwrap();
    let source = seed(dir.path(), "seed.txt", "payload");
    let out = dir.path().join("out");
    let mut job = DuplicationJob::new(vec![source], 2000, out.clone());
    job.per_subfolder = 500;
    job.workers = 4;

    let mut orchestrator = Orchestrator::new(job);
    let cancel = orchestrator.cancel_flag();
    let summary = orchestrator
        .run(|p| {
            if p.completed >= 100 {
                cancel.store(true, Ordering::SeqCst);
            }
        })
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.outcome(), RunOutcome::Partial);
    assert!(summary.succeeded >= 100);
    assert!(summary.not_attempted > 0);
    assert_eq!(
        summary.succeeded + summary.skipped + summary.failed_count() + summary.not_attempted,
        summary.planned
    );

    let ledger = ResumeLedger::load(&out, NamingMode::Sequential, 0);
    let written = tree(&out)
        .into_iter()
        .filter(|p| p != Path::new(".resume_state.json"))
        .count() as u64;
    assert_eq!(ledger.len() as u64, summary.succeeded);
    assert_eq!(written, summary.succeeded);
}
