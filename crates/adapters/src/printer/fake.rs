// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake printer adapter for testing

use super::{PrinterAdapter, PrinterError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Document recorded by the fake printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedDocument {
    pub printer: String,
    pub doc_name: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct FakePrinterState {
    documents: Vec<PrintedDocument>,
    fail_open: bool,
}

/// Fake printer adapter for testing
#[derive(Clone, Default)]
pub struct FakePrinter {
    inner: Arc<Mutex<FakePrinterState>>,
}

impl FakePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all submitted documents
    pub fn documents(&self) -> Vec<PrintedDocument> {
        self.inner.lock().documents.clone()
    }

    /// Make submissions fail as if the printer could not be opened
    pub fn fail_open(&self, fail: bool) {
        self.inner.lock().fail_open = fail;
    }
}

#[async_trait]
impl PrinterAdapter for FakePrinter {
    async fn submit_raw(
        &self,
        printer: &str,
        doc_name: &str,
        data: Vec<u8>,
    ) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock();
        if inner.fail_open {
            return Err(PrinterError::Open {
                printer: printer.to_string(),
                message: "printer unavailable".to_string(),
            });
        }
        inner.documents.push(PrintedDocument {
            printer: printer.to_string(),
            doc_name: doc_name.to_string(),
            data,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
