// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DOS-device binding.
//!
//! A DOS device is a named symbolic link in the Windows kernel object
//! namespace; defining one is process-external mutable state, so every
//! successful `define` must be paired with a matching `remove` on all exit
//! paths.

mod null;

#[cfg(windows)]
mod dosdevice;

#[cfg(windows)]
pub use dosdevice::{normalize_long_path, DosDeviceBinder};
pub use null::NullBinder;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BinderCall, FakeBinder};

use thiserror::Error;

/// Errors from DOS-device operations
#[derive(Debug, Error)]
pub enum BinderError {
    #[error("defining device {device} failed: {source}")]
    Define {
        device: String,
        #[source]
        source: std::io::Error,
    },
    #[error("removing device {device} failed: {source}")]
    Remove {
        device: String,
        #[source]
        source: std::io::Error,
    },
    #[error("querying device {device} failed: {source}")]
    Query {
        device: String,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter for the process-global DOS-device table.
///
/// Targets are raw object-namespace paths (typically `\??\<file>`) taken
/// verbatim; no path normalisation happens behind this trait.
pub trait DeviceBinder: Clone + Send + Sync + 'static {
    /// Register `device` as a symbolic link to `target`, without a system
    /// broadcast.
    fn define(&self, device: &str, target: &str) -> Result<(), BinderError>;

    /// Remove the definition of `device` pointing at exactly `target`,
    /// broadcasting the change.
    fn remove(&self, device: &str, target: &str) -> Result<(), BinderError>;

    /// Current targets of `device`; empty when the device is unbound.
    fn query(&self, device: &str) -> Result<Vec<String>, BinderError>;
}

/// Apply the `\\?\` long-path prefix to an absolute path string.
///
/// UNC paths (`\\server\share`) become `\\?\UNC\server\share`; paths that
/// already carry the prefix pass through unchanged.
pub fn add_long_path_prefix(absolute: &str) -> String {
    if absolute.starts_with(r"\\?\") {
        absolute.to_string()
    } else if let Some(rest) = absolute.strip_prefix(r"\\") {
        format!(r"\\?\UNC\{}", rest)
    } else {
        format!(r"\\?\{}", absolute)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
