// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of a processed job to its destination.
//!
//! The destination label selects one of four modes: show the PDF, raise
//! the viewer's print dialog, print the PDF silently through the viewer,
//! or forward the raw PCL stream to a printer queue.

use regex::Regex;
use spool_adapters::process;
use spool_adapters::{PrinterAdapter, PrinterError};
use spool_pcl::Envelope;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Destination label for "render and show the PDF".
pub const PDF_TARGET: &str = "PDF";

/// Destination label for the viewer's printer-selection dialog.
pub const CHOOSE_PRINTER_TARGET: &str = "Drucker wählen";

/// One-line viewer script that opens the print dialog.
const PRINT_DIALOG_JS: &str = "this.print({bUI:true,bSilent:true,bShrinkToFit:false});\r\n";

/// Title fragment of the dialog window the viewer opens.
#[cfg(windows)]
const PRINT_DIALOG_TITLE: &str = "Drucken";

/// Cadence of the dialog-raising poll.
#[cfg(windows)]
const PRINT_DIALOG_POLL: std::time::Duration = std::time::Duration::from_millis(50);

/// Poll attempts before concluding the viewer never opened a dialog.
#[cfg(windows)]
const PRINT_DIALOG_ATTEMPTS: u32 = 200;

/// How a job reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Produce a PDF and open it in the default viewer.
    ShowPdf,
    /// Produce a PDF and raise the viewer's print dialog.
    ChoosePrinter,
    /// Produce a PDF and print it silently via the viewer.
    PrintViaPdf,
    /// Forward the raw bytes to the printer queue.
    ForwardRaw,
}

/// Select the delivery mode for a destination label.
pub fn select_mode(printer: &str, print_via_pdf: bool, pattern: Option<&Regex>) -> DeliveryMode {
    match printer {
        PDF_TARGET => DeliveryMode::ShowPdf,
        CHOOSE_PRINTER_TARGET => DeliveryMode::ChoosePrinter,
        _ if print_via_pdf || pattern.is_some_and(|re| re.is_match(printer)) => {
            DeliveryMode::PrintViaPdf
        }
        _ => DeliveryMode::ForwardRaw,
    }
}

/// Errors from job delivery
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Printer(#[from] PrinterError),
    #[error("{tool} failed to run: {message}")]
    Viewer { tool: String, message: String },
    #[error("{tool} exited with {status}")]
    ViewerStatus {
        tool: String,
        status: std::process::ExitStatus,
    },
    #[error("delivery I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes the delivery modes against the viewer and printer seams.
pub struct Dispatcher<P: PrinterAdapter> {
    printer: P,
    pdf_viewer: PathBuf,
}

impl<P: PrinterAdapter> Dispatcher<P> {
    pub fn new(printer: P, pdf_viewer: PathBuf) -> Self {
        Self { printer, pdf_viewer }
    }

    /// Open `pdf` in the default viewer (fire and forget).
    #[cfg(windows)]
    pub fn show_pdf(&self, pdf: &Path) -> Result<(), DeliveryError> {
        tracing::debug!(pdf = %pdf.display(), "opening PDF file with default viewer");
        let system_root =
            std::env::var("SYSTEMROOT").unwrap_or_else(|_| r"c:\windows".to_string());
        let rundll = Path::new(&system_root).join("system32").join("rundll32.exe");
        let args = [
            "SHELL32.DLL,ShellExec_RunDLL".to_string(),
            pdf.display().to_string(),
        ];
        let mut cmd = process::command_with_cmdline(&rundll, &args);
        cmd.spawn().map_err(|e| DeliveryError::Viewer {
            tool: "rundll32.exe".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    #[cfg(not(windows))]
    pub fn show_pdf(&self, pdf: &Path) -> Result<(), DeliveryError> {
        Err(DeliveryError::Viewer {
            tool: "rundll32.exe".to_string(),
            message: format!("no shell viewer available for {}", pdf.display()),
        })
    }

    /// Print `pdf` to `printer` with default settings through the viewer.
    pub async fn print_pdf(&self, printer: &str, pdf: &Path) -> Result<(), DeliveryError> {
        tracing::debug!(printer, pdf = %pdf.display(), "sending PDF to printer with default settings");
        // The printer argument carries quotes in the middle; it must reach
        // the viewer verbatim, so the segments bypass argument escaping.
        let segments = vec![
            format!("/print:default&showui=no&printer=\"{}\"", printer),
            process::escape_argument(&pdf.display().to_string()),
        ];
        self.run_viewer(segments).await
    }

    /// Raise the viewer's print dialog for `pdf`, letting the user pick
    /// the printer.
    pub async fn print_pdf_select_printer(
        &self,
        capture: &Path,
        pdf: &Path,
    ) -> Result<(), DeliveryError> {
        tracing::debug!(pdf = %pdf.display(), "opening PDF viewer print dialog");

        let js = capture.with_extension("js");
        fs::write(&js, PRINT_DIALOG_JS)?;

        // The dialog opens below the calling window and the viewer UI is
        // suppressed, so it has to be forced topmost from the background
        // while the viewer call blocks.
        #[cfg(windows)]
        raise_print_dialog();

        let segments = vec![
            process::escape_argument("/runjs:showui=no"),
            process::escape_argument(&js.display().to_string()),
            process::escape_argument(&pdf.display().to_string()),
        ];
        let result = self.run_viewer(segments).await;

        if let Err(e) = fs::remove_file(&js) {
            if e.kind() != ErrorKind::NotFound {
                tracing::debug!(file = %js.display(), error = %e, "failed to remove viewer script");
            }
        }
        result
    }

    /// Forward the raw PCL stream to the printer queue.
    pub async fn forward_raw(
        &self,
        printer: &str,
        doc_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        tracing::info!(printer, "passing raw PCL data stream to printer");
        self.printer.submit_raw(printer, doc_name, data).await?;
        Ok(())
    }

    /// Wrap the payload in a PJL job envelope and submit it RAW.
    pub async fn submit_wrapped(
        &self,
        printer: &str,
        doc_name: &str,
        envelope: &Envelope<'_>,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        tracing::info!(printer, "passing wrapped data stream to printer");
        let data = envelope.wrap(payload);
        self.printer.submit_raw(printer, doc_name, data).await?;
        Ok(())
    }

    async fn run_viewer(&self, segments: Vec<String>) -> Result<(), DeliveryError> {
        let tool = self
            .pdf_viewer
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.pdf_viewer.display().to_string());
        tracing::debug!(viewer = %self.pdf_viewer.display(), cmdline = %segments.join(" "), "running viewer");

        let mut cmd = viewer_command(&self.pdf_viewer, &segments);
        let status = cmd.status().await.map_err(|e| DeliveryError::Viewer {
            tool: tool.clone(),
            message: e.to_string(),
        })?;
        if !status.success() {
            return Err(DeliveryError::ViewerStatus { tool, status });
        }
        Ok(())
    }
}

/// The viewer parses its own command line; the pre-rendered segments are
/// joined verbatim instead of going through per-argument escaping.
#[cfg(windows)]
fn viewer_command(viewer: &Path, segments: &[String]) -> tokio::process::Command {
    use std::os::windows::process::CommandExt;
    let mut cmd = std::process::Command::new(viewer);
    cmd.raw_arg(segments.join(" "));
    tokio::process::Command::from(cmd)
}

#[cfg(not(windows))]
fn viewer_command(viewer: &Path, segments: &[String]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(viewer);
    cmd.args(segments);
    cmd
}

/// Poll for the viewer's print dialog and force it topmost once it shows
/// up. The poll is bounded: a viewer that never opens a dialog must not
/// leave a task polling for the rest of the process lifetime.
#[cfg(windows)]
fn raise_print_dialog() {
    tokio::spawn(async {
        for _ in 0..PRINT_DIALOG_ATTEMPTS {
            tokio::time::sleep(PRINT_DIALOG_POLL).await;
            if spool_adapters::window::raise_window_containing(PRINT_DIALOG_TITLE) {
                tracing::debug!("found print dialog, moved to foreground");
                return;
            }
        }
        tracing::debug!("print dialog never appeared");
    });
}

#[cfg(test)]
#[path = "deliver_tests.rs"]
mod tests;
