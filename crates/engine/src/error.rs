// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the spool engine

use spool_adapters::BinderError;
use spool_core::State;
use thiserror::Error;

/// Errors that can occur in the monitor and its queues
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid device {0}, only LPT1 through LPT9 are supported")]
    InvalidDevice(String),
    #[error("cannot add {0}, already monitoring")]
    DuplicateQueue(String),
    #[error("spool file name must not contain path components: {0}")]
    SpoolFileName(String),
    #[error("cannot start queue {name} in state {state}")]
    QueueState { name: String, state: State },
    #[error("queue {0} already has a job")]
    AlreadySpooling(String),
    #[error("cannot start monitor in state {0}")]
    MonitorState(State),
    #[error(transparent)]
    Binder(#[from] BinderError),
    #[error("filesystem watch failed: {0}")]
    Watch(#[from] notify::Error),
    #[error("spool I/O error: {0}")]
    Spool(#[from] std::io::Error),
}
