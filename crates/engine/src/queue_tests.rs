// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the queue state machine and job submission

use super::*;
use crate::monitor::{JobValidator, MonitorHandle};
use spool_adapters::{BinderCall, FakeBinder};
use spool_core::{MemorySettings, TaskGroup};
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicUsize;
use tempfile::TempDir;
use tokio::sync::mpsc;

struct Fixture {
    _dir: TempDir,
    binder: FakeBinder,
    queue: Arc<Queue<FakeBinder>>,
    tasks: TaskGroup,
    jobs_rx: mpsc::Receiver<Arc<Job>>,
    spooling_rx: mpsc::Receiver<i64>,
}

fn fixture(validator: Option<JobValidator>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let binder = FakeBinder::new();
    let tasks = TaskGroup::new();
    let (jobs_tx, jobs_rx) = mpsc::channel(1);
    let (spooling_tx, spooling_rx) = mpsc::channel(1);
    let handle = MonitorHandle {
        jobs: jobs_tx,
        spooling: spooling_tx,
        active: Arc::new(AtomicI64::new(0)),
        tasks: tasks.clone(),
        validator,
    };
    let queue = Arc::new(Queue::new(
        "LPT1",
        dir.path().join("lpt-1.txt"),
        "test queue",
        Duration::from_millis(300),
        binder.clone(),
        handle,
    ));
    Fixture {
        _dir: dir,
        binder,
        queue,
        tasks,
        jobs_rx,
        spooling_rx,
    }
}

#[test]
fn start_binds_device_and_creates_empty_spool_file() {
    let f = fixture(None);
    f.queue.start().unwrap();

    let spool = f.queue.spool_path();
    assert!(spool.exists());
    assert_eq!(fs::metadata(spool).unwrap().len(), 0);
    assert_eq!(f.queue.state(), State::Running);

    let target = format!(r"\??\{}", spool.display());
    assert_eq!(f.binder.targets("LPT1"), vec![target]);
}

#[test]
fn start_requires_valid_state() {
    let f = fixture(None);
    f.queue.start().unwrap();
    let err = f.queue.start().unwrap_err();
    assert!(matches!(err, EngineError::QueueState { .. }));
}

#[test]
fn failed_start_removes_spool_file_and_keeps_state() {
    let f = fixture(None);
    f.binder.fail_define(true);

    let err = f.queue.start().unwrap_err();
    assert!(matches!(err, EngineError::Binder(_)));
    assert!(!f.queue.spool_path().exists());
    assert_eq!(f.queue.state(), State::Valid);

    f.binder.fail_define(false);
    f.queue.start().unwrap();
    assert_eq!(f.queue.state(), State::Running);
}

#[test]
fn stop_removes_binding_and_files() {
    let f = fixture(None);
    f.queue.start().unwrap();
    f.queue.stop();

    assert_eq!(f.queue.state(), State::Stopped);
    assert!(!f.queue.spool_path().exists());
    assert!(f.binder.targets("LPT1").is_empty());
    assert!(f
        .binder
        .calls()
        .iter()
        .any(|c| matches!(c, BinderCall::Remove { device, .. } if device == "LPT1")));
}

#[test]
fn stop_when_not_running_is_a_no_op() {
    let f = fixture(None);
    f.queue.stop();
    assert_eq!(f.queue.state(), State::Valid);
    assert!(f.binder.calls().is_empty());
}

#[test]
fn drop_releases_a_running_binding() {
    let f = fixture(None);
    f.queue.start().unwrap();
    drop(f.queue);
    assert!(f.binder.targets("LPT1").is_empty());
}

#[test]
fn start_job_freezes_settings() {
    let f = fixture(None);
    f.queue.start().unwrap();

    let settings = Arc::new(MemorySettings::new());
    settings.set("printer", "Laser");
    settings.set("print_via_pdf", "true");
    settings.set("media_source", "TRAY2");
    f.queue.set_settings(settings);

    let job = f.queue.start_job().unwrap();
    assert!(f.queue.is_spooling());
    assert_eq!(job.printer(), "Laser");
    assert!(job.options.print_via_pdf);
    assert_eq!(job.options.media_source.as_deref(), Some("TRAY2"));
    assert!(!job.is_submitted());
    assert!(job.name.starts_with("pj-"));
    assert_eq!(
        job.capture_path,
        f.queue.spool_path().with_file_name(format!("{}.txt", job.name))
    );
}

#[test]
fn start_job_twice_fails() {
    let f = fixture(None);
    f.queue.start().unwrap();
    f.queue.start_job().unwrap();
    assert!(matches!(
        f.queue.start_job(),
        Err(EngineError::AlreadySpooling(_))
    ));
}

#[test]
fn job_names_stay_distinct_within_a_second() {
    let f = fixture(None);
    f.queue.start().unwrap();

    let first = f.queue.start_job().unwrap();
    first.mark_submitted();
    f.queue.reset(true).unwrap();

    let second = f.queue.start_job().unwrap();
    assert!(second.name > first.name);
    assert_ne!(second.capture_path, first.capture_path);
}

#[test]
fn reset_breaks_the_capture_hardlink() {
    let f = fixture(None);
    f.queue.start().unwrap();
    fs::write(f.queue.spool_path(), b"AAA").unwrap();

    let capture = f.queue.spool_path().with_file_name("capture.txt");
    fs::hard_link(f.queue.spool_path(), &capture).unwrap();

    f.queue.reset(false).unwrap();
    fs::write(f.queue.spool_path(), b"BBB").unwrap();

    assert_eq!(fs::read(&capture).unwrap(), b"AAA");
    assert_eq!(fs::read(f.queue.spool_path()).unwrap(), b"BBB");
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_without_validator_hands_the_job_off() {
    let mut f = fixture(None);
    f.queue.start().unwrap();
    fs::write(f.queue.spool_path(), b"Hello").unwrap();

    f.queue.start_job().unwrap();
    assert_eq!(f.spooling_rx.recv().await, Some(1));

    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);

    let job = f.jobs_rx.try_recv().unwrap();
    assert!(job.is_submitted());
    assert_eq!(fs::read(&job.capture_path).unwrap(), b"Hello");

    // The spool file was reset for the next job.
    assert_eq!(fs::metadata(f.queue.spool_path()).unwrap().len(), 0);
    assert!(!f.queue.is_spooling());
    assert_eq!(f.spooling_rx.recv().await, Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_is_idempotent() {
    let mut f = fixture(None);
    f.queue.start().unwrap();
    fs::write(f.queue.spool_path(), b"once").unwrap();

    f.queue.start_job().unwrap();
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);

    // A second submission pass finds no current job.
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);

    assert!(f.jobs_rx.try_recv().is_ok());
    assert!(f.jobs_rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn validator_rejection_leaves_the_job_pending() {
    let calls = Arc::new(AtomicUsize::new(0));
    let validator: JobValidator = {
        let calls = Arc::clone(&calls);
        Arc::new(move |_file: &fs::File| calls.fetch_add(1, Ordering::SeqCst) >= 1)
    };
    let mut f = fixture(Some(validator));
    f.queue.start().unwrap();
    fs::write(f.queue.spool_path(), b"data").unwrap();
    f.queue.start_job().unwrap();

    // First pass: validator says no, the job stays current.
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);
    assert!(f.queue.is_spooling());
    assert!(f.jobs_rx.try_recv().is_err());

    // Second pass: validator accepts.
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);
    assert!(!f.queue.is_spooling());
    assert!(f.jobs_rx.try_recv().is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn write_during_validation_defers_the_job() {
    let calls = Arc::new(AtomicUsize::new(0));
    // The validator only receives the open capture file; the racing write
    // goes through the spool path, which is hardlinked to the same inode.
    let spool_path: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
    let validator: JobValidator = {
        let calls = Arc::clone(&calls);
        let spool_path = Arc::clone(&spool_path);
        Arc::new(move |_file: &fs::File| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(Duration::from_millis(20));
                if let Some(path) = spool_path.lock().as_ref() {
                    use std::io::Write;
                    let mut f = fs::OpenOptions::new().append(true).open(path).unwrap();
                    f.write_all(b" more").unwrap();
                }
            }
            true
        })
    };
    let mut f = fixture(Some(validator));
    *spool_path.lock() = Some(f.queue.spool_path().to_path_buf());
    f.queue.start().unwrap();
    fs::write(f.queue.spool_path(), b"data").unwrap();
    f.queue.start_job().unwrap();

    // The mtime moved between the two stats, so the pass is discarded.
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);
    assert!(f.queue.is_spooling());

    // Quiet validation accepts.
    Arc::clone(&f.queue).submit_job();
    assert!(f.tasks.wait_timeout(Duration::from_secs(2)).await);
    assert!(!f.queue.is_spooling());
    let job = f.jobs_rx.try_recv().unwrap();
    assert_eq!(fs::read(&job.capture_path).unwrap(), b"data more");
}
