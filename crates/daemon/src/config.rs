// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! A single TOML file describes tool paths, printing behaviour, the
//! watched devices and the per-printer job configurations the tray UI
//! offers. Every field has a default so a minimal file only lists the
//! devices.

use regex::Regex;
use serde::Deserialize;
use spool_engine::{HandlerConfig, PdfPipeline};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid print_via_pdf_pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid timeout for device {device}: {message}")]
    Timeout { device: String, message: String },
}

/// Parse a duration string like "500ms", "30s", "5m" into a Duration
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the numeric prefix
    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", s))?;

    let multiplier = match suffix.trim() {
        "ms" | "millis" | "millisecond" | "milliseconds" => {
            return Ok(Duration::from_millis(num));
        }
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        other => return Err(format!("unknown duration suffix: {}", other)),
    };

    Ok(Duration::from_secs(num * multiplier))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub printing: Printing,
    #[serde(default)]
    pub devices: HashMap<String, DeviceConfig>,
    #[serde(default)]
    pub printers: HashMap<String, PrinterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory holding the spool and capture files.
    pub spool_dir: PathBuf,
    /// Where shown PDFs land.
    pub pdf_dir: PathBuf,
    /// Where PDFs printed through the viewer land.
    pub print_dir: PathBuf,
    pub ghost_pcl: PathBuf,
    pub ghost_script: PathBuf,
    pub pdf_viewer: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            spool_dir: PathBuf::from(r"w:\"),
            pdf_dir: PathBuf::from(r"h:\ibest"),
            print_dir: PathBuf::from(r"w:\"),
            ghost_pcl: PathBuf::from("gpcl6win32.exe"),
            ghost_script: PathBuf::from("gswin32c.exe"),
            pdf_viewer: PathBuf::from(
                r"c:\Program Files\Tracker Software\PDF Viewer\PDFXCview.exe",
            ),
            log_file: PathBuf::from(r"w:\printlog.txt"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Printing {
    /// Destinations matching this pattern print via an intermediate PDF.
    pub print_via_pdf_pattern: String,
    pub scale_non_pjl_jobs: bool,
    /// Assumed source page size in millimetres for scaled list jobs.
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub keep_unscaled_pdf: bool,
}

impl Default for Printing {
    fn default() -> Self {
        Self {
            print_via_pdf_pattern: "umgeleitet".to_string(),
            scale_non_pjl_jobs: true,
            scaled_width: 221,
            scaled_height: 297,
            keep_unscaled_pdf: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Menu ordering key.
    pub pos: u32,
    /// OS device name, e.g. `LPT1`.
    pub device: String,
    /// Spool file base name, e.g. `lpt-1.txt`.
    pub file: String,
    /// Human-readable label.
    pub name: String,
    /// Inactivity timeout, e.g. `"500ms"` or `"2s"`.
    pub timeout: String,
    /// Initial destination; empty selects the system default printer.
    pub target: String,
    pub extend_timeout: bool,
    pub print_via_pdf: bool,
    /// Selected job configuration per printer name.
    pub job_configs: HashMap<String, String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            pos: 0,
            device: String::new(),
            file: String::new(),
            name: String::new(),
            timeout: "1s".to_string(),
            target: String::new(),
            extend_timeout: false,
            print_via_pdf: false,
            job_configs: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub name: String,
    pub default_job: String,
    pub jobs: HashMap<String, JobConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Menu ordering key.
    pub pos: u32,
    pub name: String,
    pub description: String,
    /// PJL `SET MEDIASOURCE` value, e.g. `TRAY2`.
    pub paper_tray_pjl_code: String,
    pub color: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Devices in menu order.
    pub fn devices_in_order(&self) -> Vec<&DeviceConfig> {
        let mut devices: Vec<&DeviceConfig> = self.devices.values().collect();
        devices.sort_by_key(|d| d.pos);
        devices
    }

    /// Inactivity timeout of a device.
    pub fn device_timeout(&self, device: &DeviceConfig) -> Result<Duration, ConfigError> {
        parse_duration(&device.timeout).map_err(|message| ConfigError::Timeout {
            device: device.device.clone(),
            message,
        })
    }

    pub fn handler_config(&self) -> Result<HandlerConfig, ConfigError> {
        let pattern = if self.printing.print_via_pdf_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(&self.printing.print_via_pdf_pattern)?)
        };
        Ok(HandlerConfig {
            pdf_dir: self.paths.pdf_dir.clone(),
            print_dir: self.paths.print_dir.clone(),
            print_via_pdf_pattern: pattern,
            scale_lists: self.printing.scale_non_pjl_jobs,
        })
    }

    pub fn pdf_pipeline(&self) -> PdfPipeline {
        PdfPipeline {
            ghost_pcl: self.paths.ghost_pcl.clone(),
            ghost_script: self.paths.ghost_script.clone(),
            scaled_width: self.printing.scaled_width,
            scaled_height: self.printing.scaled_height,
            keep_unscaled: self.printing.keep_unscaled_pdf,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
