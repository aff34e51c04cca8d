// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op binder for dry-run operation and non-Windows builds.

use super::{BinderError, DeviceBinder};

/// Binder that accepts every operation without touching the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBinder;

impl DeviceBinder for NullBinder {
    fn define(&self, device: &str, target: &str) -> Result<(), BinderError> {
        tracing::debug!(device, target, "null binder: define ignored");
        Ok(())
    }

    fn remove(&self, device: &str, target: &str) -> Result<(), BinderError> {
        tracing::debug!(device, target, "null binder: remove ignored");
        Ok(())
    }

    fn query(&self, _device: &str) -> Result<Vec<String>, BinderError> {
        Ok(Vec::new())
    }
}
