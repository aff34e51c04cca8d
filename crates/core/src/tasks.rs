// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counted task spawning with a waitable shutdown barrier.
//!
//! Every background task the daemon owns (job submission workers, the job
//! handler, the monitor itself) is spawned through a shared [`TaskGroup`].
//! Shutdown waits on the group with a bounded timeout; if tasks are still
//! running when the timeout elapses, shutdown reports failure instead of
//! hanging.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Cheaply clonable group of counted tasks.
#[derive(Clone, Default)]
pub struct TaskGroup {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    active: AtomicUsize,
    idle: Notify,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently running.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Spawn a task counted towards the group.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            task.await;
            if inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.idle.notify_waiters();
            }
        });
    }

    /// Wait until every task in the group has finished.
    pub async fn wait(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            // Register before checking the counter so a task finishing
            // in between cannot lose the wakeup.
            idle.as_mut().enable();
            if self.inner.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Wait for the group with a timeout. Returns `false` if tasks were
    /// still running when the timeout elapsed.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
