// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-device queue and its current job.
//!
//! A queue owns a spool file inside the monitor's directory, the DOS-device
//! binding pointing at it, and at most one job being accumulated. The
//! monitor loop drives the state transitions; job submission runs on a
//! worker task so the next job can start while the previous one is still
//! being captured.

use crate::error::EngineError;
use crate::monitor::MonitorHandle;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use spool_adapters::DeviceBinder;
use spool_core::{names, NullSettings, Settings, State};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Options captured from the queue settings when a job starts spooling.
///
/// The tray UI and configuration layer feed these through the opaque
/// [`Settings`] accessor; the engine freezes them per job so a menu change
/// mid-spool cannot tear a job between two destinations.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Destination label (`PDF`, `Drucker wählen`, or a printer name).
    pub printer: String,
    /// Force the render-to-PDF delivery path for this device.
    pub print_via_pdf: bool,
    /// Wrap RAW submissions in a PJL job envelope.
    pub wrap: bool,
    /// PJL `SET MEDIASOURCE` value for wrapped submissions.
    pub media_source: Option<String>,
    /// Duplex selection for wrapped submissions.
    pub duplex: bool,
}

impl JobOptions {
    fn from_settings(settings: &dyn Settings) -> Self {
        let media_source = settings.get("media_source");
        Self {
            printer: settings.get("printer"),
            print_via_pdf: flag(&settings.get("print_via_pdf")),
            wrap: flag(&settings.get("wrap")),
            media_source: (!media_source.is_empty()).then_some(media_source),
            duplex: flag(&settings.get("duplex")),
        }
    }
}

fn flag(value: &str) -> bool {
    matches!(value, "true" | "1" | "on")
}

/// A print job being accumulated, then captured and handed off.
#[derive(Debug)]
pub struct Job {
    /// Creation instant, the source of the `pj-…` name.
    pub time: DateTime<Local>,
    pub name: String,
    /// Capture file next to the spool file (`<name>.txt`).
    pub capture_path: PathBuf,
    pub options: JobOptions,
    submitted: AtomicBool,
    submit_lock: tokio::sync::Mutex<()>,
}

impl Job {
    /// Destination label captured when the job started.
    pub fn printer(&self) -> &str {
        &self.options.printer
    }

    /// The job has been handed to the outbound channel (or dropped).
    pub fn is_submitted(&self) -> bool {
        self.submitted.load(Ordering::SeqCst)
    }

    fn mark_submitted(&self) {
        self.submitted.store(true, Ordering::SeqCst);
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

struct QueueInner {
    state: State,
    job: Option<Arc<Job>>,
    last_activity: Instant,
    last_job_stamp: Option<DateTime<Local>>,
}

/// One watched device: spool file, state machine, current job.
pub struct Queue<B: DeviceBinder> {
    device: String,
    spool_path: PathBuf,
    name: String,
    timeout: Duration,
    binder: B,
    handle: MonitorHandle,
    settings: Mutex<Arc<dyn Settings>>,
    inner: Mutex<QueueInner>,
}

impl<B: DeviceBinder> Queue<B> {
    pub(crate) fn new(
        device: &str,
        spool_path: PathBuf,
        name: &str,
        timeout: Duration,
        binder: B,
        handle: MonitorHandle,
    ) -> Self {
        Self {
            device: device.to_string(),
            spool_path,
            name: name.to_string(),
            timeout,
            binder,
            handle,
            settings: Mutex::new(Arc::new(NullSettings)),
            inner: Mutex::new(QueueInner {
                state: State::Valid,
                job: None,
                last_activity: Instant::now(),
                last_job_stamp: None,
            }),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn settings(&self) -> Arc<dyn Settings> {
        Arc::clone(&self.settings.lock())
    }

    /// Replace the settings accessor (UI / configuration integration).
    pub fn set_settings(&self, settings: Arc<dyn Settings>) {
        *self.settings.lock() = settings;
    }

    pub fn is_spooling(&self) -> bool {
        self.inner.lock().job.is_some()
    }

    pub(crate) fn state(&self) -> State {
        self.inner.lock().state
    }

    /// Raw object-namespace target of the DOS-device binding.
    fn device_target(&self) -> String {
        format!(r"\??\{}", self.spool_path.display())
    }

    /// Bind the device to a fresh, empty spool file.
    pub(crate) fn start(&self) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        if inner.state != State::Valid {
            return Err(EngineError::QueueState {
                name: self.name.clone(),
                state: inner.state,
            });
        }

        self.reset_while_locked(&mut inner, false)?;

        if let Err(e) = self.binder.define(&self.device, &self.device_target()) {
            let _ = fs::remove_file(&self.spool_path);
            return Err(e.into());
        }

        inner.state = State::Running;
        tracing::info!(file = %self.spool_path.display(), "started queue");
        Ok(())
    }

    /// Release the binding and delete the spool file. Errors are logged,
    /// not propagated.
    pub(crate) fn stop(&self) {
        let mut inner = self.inner.lock();
        self.stop_while_locked(&mut inner);
    }

    fn stop_while_locked(&self, inner: &mut QueueInner) {
        if inner.state != State::Running {
            return;
        }

        if let Err(e) = self.binder.remove(&self.device, &self.device_target()) {
            tracing::error!(device = %self.device, error = %e, "failed to remove device binding");
        }
        if let Err(e) = fs::remove_file(&self.spool_path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::error!(file = %self.spool_path.display(), error = %e, "failed to remove spool file");
            }
        }
        if let Some(job) = inner.job.take() {
            if let Err(e) = fs::remove_file(&job.capture_path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::error!(file = %job.capture_path.display(), error = %e, "failed to remove capture file");
                }
            }
        }
        inner.state = State::Stopped;
        tracing::info!(file = %self.spool_path.display(), "stopped queue");
    }

    /// Open a new job; fails if one is already being accumulated.
    pub(crate) fn start_job(&self) -> Result<Arc<Job>, EngineError> {
        let mut inner = self.inner.lock();
        if inner.job.is_some() {
            return Err(EngineError::AlreadySpooling(self.name.clone()));
        }

        let mut stamp = Local::now();
        if let Some(prev) = inner.last_job_stamp {
            // Job names have second resolution; keep them distinct and
            // monotone across rapid-fire jobs.
            if stamp.timestamp() <= prev.timestamp() {
                stamp = prev + chrono::Duration::seconds(1);
            }
        }

        let name = names::job_name(&stamp);
        let settings = Arc::clone(&self.settings.lock());
        let job = Arc::new(Job {
            time: stamp,
            name: name.clone(),
            capture_path: self.spool_path.with_file_name(format!("{}.txt", name)),
            options: JobOptions::from_settings(settings.as_ref()),
            submitted: AtomicBool::new(false),
            submit_lock: tokio::sync::Mutex::new(()),
        });
        inner.job = Some(Arc::clone(&job));
        inner.last_job_stamp = Some(stamp);
        inner.last_activity = Instant::now();
        self.handle.update_spooling(1);
        Ok(job)
    }

    /// Record write activity on the spool file.
    pub(crate) fn touch(&self) {
        self.inner.lock().last_activity = Instant::now();
    }

    /// The current job has seen no writes for longer than the timeout.
    pub(crate) fn timed_out(&self) -> bool {
        let inner = self.inner.lock();
        inner.job.is_some() && inner.last_activity.elapsed() > self.timeout
    }

    /// Break any capture hardlink and recreate an empty spool file,
    /// optionally handing the submitted job to the outbound channel.
    pub(crate) fn reset(&self, submit: bool) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.reset_while_locked(&mut inner, submit)
    }

    fn reset_while_locked(&self, inner: &mut QueueInner, submit: bool) -> Result<(), EngineError> {
        // The file has to be removed instead of truncated: an active job
        // may have its capture file hardlinked to the spool file, and that
        // connection must be broken.
        match fs::remove_file(&self.spool_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if submit {
            if let Some(job) = inner.job.take_if(|j| j.is_submitted()) {
                self.handle.offer_job(job);
            }
        }

        // Create empty spool file
        fs::File::create(&self.spool_path)?;
        Ok(())
    }

    /// Schedule the current job for capture on a worker task.
    pub(crate) fn submit_job(self: Arc<Self>) {
        let job = self.inner.lock().job.clone();
        if let Some(job) = job {
            let tasks = self.handle.tasks.clone();
            tasks.spawn(async move {
                let name = job.name.clone();
                if let Err(e) = submit(self, job).await {
                    tracing::error!(job = %name, error = %e, "job submission failed");
                }
            });
        }
    }
}

impl<B: DeviceBinder> Drop for Queue<B> {
    /// Backstop: release the OS binding even if the monitor never ran its
    /// orderly stop.
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        self.stop_while_locked(&mut inner);
    }
}

#[cfg(test)]
impl Job {
    /// Build a job directly, bypassing a queue.
    pub(crate) fn for_tests(
        time: DateTime<Local>,
        name: &str,
        capture_path: PathBuf,
        options: JobOptions,
    ) -> Arc<Job> {
        Arc::new(Job {
            time,
            name: name.to_string(),
            capture_path,
            options,
            submitted: AtomicBool::new(false),
            submit_lock: tokio::sync::Mutex::new(()),
        })
    }
}

/// Capture the spool file for `job` and hand it off once it validates.
///
/// Runs under the job's own lock. The hardlink may already exist from an
/// earlier pass; retries are benign because the submitted flag is one-shot.
async fn submit<B: DeviceBinder>(queue: Arc<Queue<B>>, job: Arc<Job>) -> Result<(), EngineError> {
    let _guard = job.submit_lock.lock().await;
    if job.is_submitted() {
        return Ok(());
    }

    match fs::hard_link(&queue.spool_path, &job.capture_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e.into()),
    }

    match &queue.handle.validator {
        Some(validator) => {
            let file = fs::File::open(&job.capture_path)?;
            let before = file.metadata()?.modified()?;
            if validator(&file) {
                let after = file.metadata()?.modified()?;
                // A write racing the validator moves the mtime; leave the
                // job for the next pass.
                if after <= before {
                    job.mark_submitted();
                }
            }
        }
        None => job.mark_submitted(),
    }

    if job.is_submitted() {
        queue.reset(true)?;
        queue.handle.update_spooling(-1);
    }

    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
