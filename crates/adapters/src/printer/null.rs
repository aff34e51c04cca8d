// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op printer for dry-run operation and non-Windows builds.

use super::{PrinterAdapter, PrinterError};
use async_trait::async_trait;

/// Printer that logs and discards every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPrinter;

#[async_trait]
impl PrinterAdapter for NullPrinter {
    async fn submit_raw(
        &self,
        printer: &str,
        doc_name: &str,
        data: Vec<u8>,
    ) -> Result<(), PrinterError> {
        tracing::info!(
            printer,
            doc_name,
            bytes = data.len(),
            "null printer: document discarded"
        );
        Ok(())
    }
}
