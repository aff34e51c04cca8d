// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spool-pcl: PCL/PJL byte stream handling.
//!
//! Captured print jobs arrive as raw PCL, usually wrapped in a PJL job
//! envelope by the emitting application. This crate analyses the stream
//! (orientation, positioning, PJL wrapping), strips the commands the
//! spooler re-emits itself, and writes the PJL envelope used when a job is
//! submitted to a RAW printer queue.

pub mod analysis;
pub mod envelope;
pub mod markers;
pub mod sanitize;

pub use analysis::{analyze, check_size, Analysis, JobType, Orientation, ParseError, MAX_JOB_SIZE};
pub use envelope::{Envelope, Language};
pub use sanitize::sanitize;
