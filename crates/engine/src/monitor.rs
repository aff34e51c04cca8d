// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide monitor supervising the spool directory.
//!
//! The monitor owns every queue and runs a single cooperative loop over
//! three sources: shutdown, filesystem events on the spool directory, and
//! a periodic tick. Completed jobs leave through a bounded channel with
//! drop-on-full semantics so a slow consumer can never stall the OS-device
//! spool.

use crate::error::EngineError;
use crate::queue::{Job, Queue};
use notify::{RecursiveMode, Watcher};
use spool_adapters::DeviceBinder;
use spool_core::{State, TaskGroup};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Notify;

/// Optional content check run against the open capture file before a job
/// is accepted.
pub type JobValidator = Arc<dyn Fn(&std::fs::File) -> bool + Send + Sync>;

/// Default inactivity timeout for LPT queues.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Bound of the inbound filesystem-event channel.
const FS_EVENT_CAPACITY: usize = 10;

/// Cadence of the timeout-reconciliation tick.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Non-owning back-reference from queues (and their submission workers) to
/// the monitor: the outbound channels, the active-count gauge, and the
/// shared task group.
#[derive(Clone)]
pub(crate) struct MonitorHandle {
    pub(crate) jobs: mpsc::Sender<Arc<Job>>,
    pub(crate) spooling: mpsc::Sender<i64>,
    pub(crate) active: Arc<AtomicI64>,
    pub(crate) tasks: TaskGroup,
    pub(crate) validator: Option<JobValidator>,
}

impl MonitorHandle {
    /// Adjust the number-of-active-jobs gauge and publish the new value.
    pub(crate) fn update_spooling(&self, delta: i64) {
        let new = self.active.fetch_add(delta, Ordering::SeqCst) + delta;
        // One-slot coalescing mailbox: skip the send when full, the
        // consumer only needs a recent value.
        let _ = self.spooling.try_send(new);
    }

    /// Offer a submitted job to the outbound channel; a full channel drops
    /// the job.
    pub(crate) fn offer_job(&self, job: Arc<Job>) {
        let name = job.name.clone();
        match self.jobs.try_send(job) {
            Ok(()) => tracing::debug!(job = %name, "submitted job to work queue"),
            Err(TrySendError::Full(_)) => {
                tracing::error!(job = %name, "dropped job, work queue is full");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(job = %name, "dropped job, work queue is closed");
            }
        }
    }
}

/// Supervisor for a spool directory full of device queues.
pub struct Monitor<B: DeviceBinder> {
    path: PathBuf,
    state: State,
    binder: B,
    queues: HashMap<String, Arc<Queue<B>>>,
    handle: MonitorHandle,
    jobs_rx: Option<mpsc::Receiver<Arc<Job>>>,
    spooling_rx: Option<mpsc::Receiver<i64>>,
}

impl<B: DeviceBinder> Monitor<B> {
    pub fn new(
        path: impl Into<PathBuf>,
        binder: B,
        tasks: TaskGroup,
        validator: Option<JobValidator>,
    ) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel(1);
        let (spooling_tx, spooling_rx) = mpsc::channel(1);
        Self {
            path: path.into(),
            state: State::Valid,
            binder,
            queues: HashMap::new(),
            handle: MonitorHandle {
                jobs: jobs_tx,
                spooling: spooling_tx,
                active: Arc::new(AtomicI64::new(0)),
                tasks,
                validator,
            },
            jobs_rx: Some(jobs_rx),
            spooling_rx: Some(spooling_rx),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the outbound channel of completed jobs. The channel closes
    /// when the monitor winds down and all submission workers are done.
    pub fn jobs(&mut self) -> Option<mpsc::Receiver<Arc<Job>>> {
        self.jobs_rx.take()
    }

    /// Take the coalescing channel of active-count gauge samples.
    pub fn spooling(&mut self) -> Option<mpsc::Receiver<i64>> {
        self.spooling_rx.take()
    }

    /// Number of queues currently spooling a job.
    pub fn active_jobs(&self) -> i64 {
        self.handle.active.load(Ordering::SeqCst)
    }

    /// Register a queue for `LPT<port>` with the standard spool file name
    /// and timeout.
    pub fn add_lpt_port(&mut self, port: u32, name: &str) -> Result<Arc<Queue<B>>, EngineError> {
        if !(1..=9).contains(&port) {
            return Err(EngineError::InvalidDevice(format!("LPT{}", port)));
        }
        self.add_device(
            &format!("LPT{}", port),
            &format!("lpt-{}.txt", port),
            name,
            DEFAULT_TIMEOUT,
        )
    }

    /// Register a queue binding `device` to `file` inside the spool
    /// directory.
    pub fn add_device(
        &mut self,
        device: &str,
        file: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<Arc<Queue<B>>, EngineError> {
        if Path::new(file).file_name() != Some(OsStr::new(file)) {
            return Err(EngineError::SpoolFileName(file.to_string()));
        }
        if self.queues.contains_key(file) {
            return Err(EngineError::DuplicateQueue(device.to_string()));
        }

        let queue = Arc::new(Queue::new(
            device,
            self.path.join(file),
            name,
            timeout,
            self.binder.clone(),
            self.handle.clone(),
        ));
        self.queues.insert(file.to_string(), Arc::clone(&queue));
        Ok(queue)
    }

    /// Run the monitor until `shutdown` fires.
    ///
    /// Consumes the monitor; on return every queue has been stopped and
    /// the outbound channels close once in-flight submission workers
    /// finish.
    pub async fn start(mut self, shutdown: Arc<Notify>) -> Result<(), EngineError> {
        let result = self.run(shutdown).await;
        for queue in self.queues.values() {
            queue.stop();
        }
        if self.state != State::Stopped {
            self.state = State::Invalid;
        }
        result
    }

    async fn run(&mut self, shutdown: Arc<Notify>) -> Result<(), EngineError> {
        if self.state != State::Valid {
            return Err(EngineError::MonitorState(self.state));
        }

        tracing::info!(path = %self.path.display(), "starting monitor");
        fs::create_dir_all(&self.path)?;

        for (file, queue) in &self.queues {
            tracing::info!(queue = %file, "starting queue");
            queue.start()?;
        }

        let (fs_tx, mut fs_rx) = mpsc::channel::<PathBuf>(FS_EVENT_CAPACITY);
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    if event.kind.is_modify() {
                        for path in event.paths {
                            // A dropped event is tolerable, the periodic
                            // tick reconciles via the inactivity timeout.
                            let _ = fs_tx.try_send(path);
                        }
                    }
                }
            })?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        // Created outside the loop: select! re-evaluates its branches on
        // each iteration, so a sleep() in a branch would reset on every
        // event and the timeouts would never fire during activity.
        let mut ticker = tokio::time::interval(TICK_INTERVAL);

        self.state = State::Running;

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    self.state = State::Stopped;
                    return Ok(());
                }

                Some(path) = fs_rx.recv() => {
                    self.handle_write_event(&path);
                }

                _ = ticker.tick() => {
                    self.check_timeouts();
                }
            }
        }
    }

    fn handle_write_event(&self, path: &Path) {
        let Some(file) = path.file_name().and_then(|f| f.to_str()) else {
            return;
        };
        let Some(queue) = self.queues.get(file) else {
            return;
        };
        tracing::debug!(queue = %queue.name(), file, "write event");

        if queue.is_spooling() {
            queue.touch();
            return;
        }

        match fs::metadata(queue.spool_path()) {
            Err(e) => {
                tracing::error!(file, error = %e, "cannot stat spool file");
                return;
            }
            // spurious write event from the creation of the spool file
            Ok(meta) if meta.len() == 0 => return,
            Ok(_) => {}
        }

        tracing::info!(queue = %queue.name(), "started new job");
        if let Err(e) = queue.start_job() {
            tracing::error!(queue = %queue.name(), error = %e, "cannot start job");
        }
    }

    fn check_timeouts(&self) {
        for (file, queue) in &self.queues {
            if queue.timed_out() {
                tracing::info!(queue = %file, "job complete");
                Arc::clone(queue).submit_job();
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
