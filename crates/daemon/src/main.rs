// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Print Spool Daemon (spoolmond)
//!
//! Binds the configured devices to spool files, watches them for print
//! jobs and dispatches completed jobs to their destinations.
//!
//! Architecture:
//! - Monitor Task: owns the spool directory, the queues and the event loop
//! - Handler Task: consumes completed jobs and runs conversion/delivery

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;

use config::Config;
use spool_core::{MemorySettings, Settings, TaskGroup};
use spool_engine::{Dispatcher, JobHandler, Monitor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info};

#[cfg(windows)]
type Binder = spool_adapters::DosDeviceBinder;
#[cfg(not(windows))]
type Binder = spool_adapters::NullBinder;

#[cfg(windows)]
type Printer = spool_adapters::WinspoolPrinter;
#[cfg(not(windows))]
type Printer = spool_adapters::NullPrinter;

/// Bound on the wait for in-flight tasks at shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(config_path) = parse_args() else {
        return Ok(());
    };

    let config = Config::load(&config_path)?;

    // Rotate log file if it has grown too large
    rotate_log_if_needed(&config.paths.log_file);

    let _log_guard = setup_logging(&config)?;

    info!(config = %config_path.display(), "starting print spool daemon");

    let tasks = TaskGroup::new();
    let mut monitor = Monitor::new(
        &config.paths.spool_dir,
        Binder::default(),
        tasks.clone(),
        None,
    );

    for device in config.devices_in_order() {
        let timeout = config.device_timeout(device)?;
        let queue = monitor.add_device(&device.device, &device.file, &device.name, timeout)?;

        let settings = Arc::new(MemorySettings::new());
        settings.set("printer", &device.target);
        if device.print_via_pdf {
            settings.set("print_via_pdf", "true");
        }
        queue.set_settings(settings);
        info!(device = %device.device, file = %device.file, "registered device");
    }

    let jobs = monitor
        .jobs()
        .ok_or("outbound job channel already taken")?;

    let dispatcher = Dispatcher::new(Printer::default(), config.paths.pdf_viewer.clone());
    let handler = JobHandler::new(dispatcher, config.pdf_pipeline(), config.handler_config()?)
        .with_error_hook(Arc::new(|message| {
            error!(message, "print job failed");
        }));

    #[cfg(not(windows))]
    tracing::warn!("DOS device binding and winspool are unavailable on this platform, running dry");

    let monitor_shutdown = Arc::new(Notify::new());
    let handler_shutdown = Arc::new(Notify::new());

    {
        let shutdown = Arc::clone(&handler_shutdown);
        tasks.spawn(async move {
            handler.run(jobs, shutdown).await;
        });
    }

    let (monitor_done_tx, monitor_done_rx) = tokio::sync::oneshot::channel();
    {
        let shutdown = Arc::clone(&monitor_shutdown);
        tasks.spawn(async move {
            let _ = monitor_done_tx.send(monitor.start(shutdown).await);
        });
    }

    info!("daemon ready");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
        result = monitor_done_rx => {
            match result {
                Ok(Err(e)) => error!(error = %e, "monitor stopped with error"),
                _ => info!("monitor stopped"),
            }
        }
    }

    monitor_shutdown.notify_one();
    handler_shutdown.notify_one();

    if tasks.wait_timeout(SHUTDOWN_TIMEOUT).await {
        info!("successful shutdown");
        Ok(())
    } else {
        error!("timeout during shutdown");
        Err("timeout during shutdown".into())
    }
}

/// Handle command-line flags; returns the config path to run with, or
/// `None` when an informational flag already answered.
fn parse_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--version") | Some("-V") => {
            println!("spoolmond {}", env!("CARGO_PKG_VERSION"));
            None
        }
        Some("--help") | Some("-h") => {
            println!("spoolmond {}", env!("CARGO_PKG_VERSION"));
            println!("Print spool daemon - redirects LPT devices into spool files and");
            println!("dispatches captured print jobs.");
            println!();
            println!("USAGE:");
            println!("    spoolmond [CONFIG]");
            println!();
            println!("ARGS:");
            println!("    CONFIG    Path to the TOML configuration (default: spoolmon.toml)");
            println!();
            println!("OPTIONS:");
            println!("    -h, --help       Print help information");
            println!("    -V, --version    Print version information");
            None
        }
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from("spoolmon.toml")),
    }
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (printlog.txt.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `printlog.txt` → `printlog.txt.1` → `.2` → `.3`, deleting the
/// oldest. Best-effort: rotation failures are silently ignored so the
/// daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    // Shift older rotations: .3 is deleted, .2→.3, .1→.2
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Rotate current log → .1
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.paths.log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let dir = config
        .paths
        .log_file
        .parent()
        .ok_or("log file has no parent directory")?;
    let file_name = config
        .paths
        .log_file
        .file_name()
        .ok_or("log file has no file name")?;

    // Rotation happens at startup via rotate_log_if_needed
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
