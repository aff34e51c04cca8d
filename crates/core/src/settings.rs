// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque per-queue settings accessor.
//!
//! A queue carries an opaque key/value view that the surrounding
//! application (tray UI, configuration layer) populates. The engine only
//! reads a handful of well-known keys when a job starts spooling:
//!
//! - `printer` — the destination label for new jobs
//! - `print_via_pdf` — `"true"` forces the render-to-PDF delivery path
//! - `wrap` — `"true"` wraps RAW submissions in a PJL job envelope
//! - `media_source` — PJL `SET MEDIASOURCE` value for wrapped jobs
//! - `duplex` — `"on"` enables duplex in wrapped jobs

use parking_lot::Mutex;
use std::collections::HashMap;

/// Key/value settings for a single queue.
pub trait Settings: Send + Sync {
    fn get(&self, name: &str) -> String;
    fn set(&self, name: &str, value: &str);
}

/// Settings stub that stores nothing and returns empty values.
#[derive(Debug, Default)]
pub struct NullSettings;

impl Settings for NullSettings {
    fn get(&self, _name: &str) -> String {
        String::new()
    }

    fn set(&self, _name: &str, _value: &str) {}
}

/// In-memory settings, seeded from configuration and mutated by the UI.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Settings for MemorySettings {
    fn get(&self, name: &str) -> String {
        self.values.lock().get(name).cloned().unwrap_or_default()
    }

    fn set(&self, name: &str, value: &str) {
        self.values
            .lock()
            .insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
