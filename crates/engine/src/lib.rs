// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spool-engine: the spool-queue engine.
//!
//! A [`Monitor`] claims legacy device names (`LPT1`…`LPT9`), points each at
//! a spool file, and watches the spool directory. Writes by a legacy
//! application open a job on the owning [`Queue`]; an inactivity timeout
//! closes it, the bytes are captured through a hardlink, and the completed
//! job travels over a bounded channel to the [`JobHandler`], which
//! sanitises the stream and delivers it (raw printer queue, PDF viewer, or
//! PDF print dialog).

mod deliver;
mod error;
mod handler;
mod monitor;
mod pdf;
mod queue;

pub use deliver::{
    select_mode, DeliveryError, DeliveryMode, Dispatcher, CHOOSE_PRINTER_TARGET, PDF_TARGET,
};
pub use error::EngineError;
pub use handler::{ErrorHook, HandlerConfig, HandlerError, JobHandler};
pub use monitor::{JobValidator, Monitor, DEFAULT_TIMEOUT};
pub use pdf::{PdfError, PdfPipeline};
pub use queue::{Job, JobOptions, Queue};
