// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RAW submission to a Windows printer queue.

mod null;

#[cfg(windows)]
mod winspool;

pub use null::NullPrinter;
#[cfg(windows)]
pub use winspool::WinspoolPrinter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePrinter, PrintedDocument};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from printer submission
#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("opening printer {printer} failed: {message}")]
    Open { printer: String, message: String },
    #[error("sending document to printer {printer} failed: {message}")]
    Write { printer: String, message: String },
}

/// Adapter for the OS printer queue.
///
/// Submission is a single RAW document: open, `StartDocument(name, "RAW")`,
/// `StartPage`, write the bytes, `EndPage`, `EndDocument`, close.
#[async_trait]
pub trait PrinterAdapter: Clone + Send + Sync + 'static {
    async fn submit_raw(
        &self,
        printer: &str,
        doc_name: &str,
        data: Vec<u8>,
    ) -> Result<(), PrinterError>;
}
