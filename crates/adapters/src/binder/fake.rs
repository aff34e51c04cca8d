// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake device binder for testing

use super::{BinderError, DeviceBinder};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded binder call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderCall {
    Define { device: String, target: String },
    Remove { device: String, target: String },
    Query { device: String },
}

#[derive(Default)]
struct FakeBinderState {
    bindings: HashMap<String, Vec<String>>,
    calls: Vec<BinderCall>,
    fail_define: bool,
}

/// Fake device binder for testing
#[derive(Clone, Default)]
pub struct FakeBinder {
    inner: Arc<Mutex<FakeBinderState>>,
}

impl FakeBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BinderCall> {
        self.inner.lock().calls.clone()
    }

    /// Current targets of a device
    pub fn targets(&self, device: &str) -> Vec<String> {
        self.inner
            .lock()
            .bindings
            .get(device)
            .cloned()
            .unwrap_or_default()
    }

    /// Make the next `define` calls fail
    pub fn fail_define(&self, fail: bool) {
        self.inner.lock().fail_define = fail;
    }
}

impl DeviceBinder for FakeBinder {
    fn define(&self, device: &str, target: &str) -> Result<(), BinderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BinderCall::Define {
            device: device.to_string(),
            target: target.to_string(),
        });
        if inner.fail_define {
            return Err(BinderError::Define {
                device: device.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        inner
            .bindings
            .entry(device.to_string())
            .or_default()
            .push(target.to_string());
        Ok(())
    }

    fn remove(&self, device: &str, target: &str) -> Result<(), BinderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BinderCall::Remove {
            device: device.to_string(),
            target: target.to_string(),
        });
        if let Some(targets) = inner.bindings.get_mut(device) {
            targets.retain(|t| t != target);
            if targets.is_empty() {
                inner.bindings.remove(device);
            }
        }
        Ok(())
    }

    fn query(&self, device: &str) -> Result<Vec<String>, BinderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BinderCall::Query {
            device: device.to_string(),
        });
        Ok(inner.bindings.get(device).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
