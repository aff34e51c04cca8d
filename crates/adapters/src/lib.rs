// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spool-adapters: the process-external seams of the spool daemon.
//!
//! Everything that touches OS-global state lives behind a trait with a
//! production implementation (Windows), a null implementation for dry-run
//! operation, and a recording fake for tests.

pub mod binder;
pub mod printer;
pub mod process;
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use binder::DosDeviceBinder;
pub use binder::{BinderError, DeviceBinder, NullBinder};
#[cfg(any(test, feature = "test-support"))]
pub use binder::{BinderCall, FakeBinder};

#[cfg(windows)]
pub use printer::WinspoolPrinter;
pub use printer::{NullPrinter, PrinterAdapter, PrinterError};
#[cfg(any(test, feature = "test-support"))]
pub use printer::{FakePrinter, PrintedDocument};
