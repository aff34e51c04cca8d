// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PDF conversion through the external ghost tools.

use chrono::{DateTime, Local};
use spool_adapters::process;
use spool_core::names;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(300);

// GhostPCL wants page dimensions in dots and renders at 720 DPI by
// default; the configuration gives millimetres.
const GHOST_DPI: f64 = 720.0;
const MM_PER_INCH: f64 = 25.4;

/// Errors from the external converters
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("{tool} failed to run: {message}")]
    Tool { tool: String, message: String },
    #[error("{tool} exited with {status}")]
    ToolStatus {
        tool: String,
        status: std::process::ExitStatus,
    },
}

/// External converter paths and scaling geometry.
#[derive(Debug, Clone)]
pub struct PdfPipeline {
    pub ghost_pcl: PathBuf,
    pub ghost_script: PathBuf,
    /// Assumed source page width in millimetres for scaled list jobs.
    pub scaled_width: u32,
    /// Assumed source page height in millimetres for scaled list jobs.
    pub scaled_height: u32,
    /// Keep the intermediate unscaled PDF instead of deleting it.
    pub keep_unscaled: bool,
}

impl PdfPipeline {
    fn base_args() -> Vec<String> {
        [
            "-dPrinted",
            "-dBATCH",
            "-dNOPAUSE",
            "-dNOSAFER",
            "-dNumCopies=1",
            "-sDEVICE=pdfwrite",
            "-dNoCancel",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Convert `input` into `Printout YYYY-MM-DD HHMMSS.pdf` in `out_dir`
    /// and return the PDF path.
    ///
    /// With `needs_scaling`, GhostPCL first renders to an intermediate PDF
    /// at the configured oversized geometry, which Ghostscript then fits
    /// onto the default page size.
    pub async fn create_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
        time: &DateTime<Local>,
        needs_scaling: bool,
    ) -> Result<PathBuf, PdfError> {
        let pdf = out_dir.join(names::pdf_name(time));
        tracing::info!(pdf = %pdf.display(), "creating PDF file");

        let unscaled = unscaled_path(input);
        let mut args = Self::base_args();
        if needs_scaling {
            tracing::info!(
                width = self.scaled_width,
                height = self.scaled_height,
                "assuming an oversized list, scaling to the default page size"
            );
            let width = (self.scaled_width as f64 * GHOST_DPI / MM_PER_INCH) as i64;
            let height = (self.scaled_height as f64 * GHOST_DPI / MM_PER_INCH) as i64;
            args.push(format!("-g{}x{}", width, height));
            args.push(format!("-sOutputFile={}", unscaled.display()));
        } else {
            args.push(format!("-sOutputFile={}", pdf.display()));
        }
        args.push(input.display().to_string());

        run_tool(&self.ghost_pcl, &args).await?;

        if needs_scaling {
            let mut args = Self::base_args();
            args.push("-dPDFFitPage".to_string());
            args.push(format!("-sOutputFile={}", pdf.display()));
            args.push(unscaled.display().to_string());

            let result = run_tool(&self.ghost_script, &args).await;
            if !self.keep_unscaled {
                if let Err(e) = std::fs::remove_file(&unscaled) {
                    if e.kind() != ErrorKind::NotFound {
                        tracing::warn!(file = %unscaled.display(), error = %e, "failed to remove intermediate PDF");
                    }
                }
            }
            result?;
        }

        Ok(pdf)
    }
}

fn unscaled_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}-unscaled.pdf", stem))
}

async fn run_tool(tool: &Path, args: &[String]) -> Result<(), PdfError> {
    let tool_name = tool
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string());
    tracing::debug!(tool = %tool.display(), cmdline = %process::build_cmdline(args), "invoking converter");

    let cmd = process::command_with_cmdline(tool, args);
    let output = process::run_tool_with_deadline(cmd, CONVERT_TIMEOUT, &tool_name)
        .await
        .map_err(|message| PdfError::Tool {
            tool: tool_name.clone(),
            message,
        })?;
    if !output.status.success() {
        return Err(PdfError::ToolStatus {
            tool: tool_name,
            status: output.status,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "pdf_tests.rs"]
mod tests;
