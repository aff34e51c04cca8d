// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker consuming completed jobs from the monitor.
//!
//! For every job: read the capture file, analyse and sanitise the stream,
//! convert to PDF when the destination requires it, deliver. Per-job
//! failures are logged (and surfaced through the error hook); the worker
//! keeps serving later jobs.

use crate::deliver::{select_mode, DeliveryError, DeliveryMode, Dispatcher};
use crate::pdf::{PdfError, PdfPipeline};
use crate::queue::Job;
use regex::Regex;
use spool_adapters::PrinterAdapter;
use spool_pcl as pcl;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::Notify;

/// Callback receiving user-visible per-job error messages. The tray UI
/// forwards these to a modal dialog; headless operation just logs.
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Errors from processing a single job
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Parse(#[from] pcl::ParseError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("job I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output directories and destination matching rules.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Where shown PDFs land.
    pub pdf_dir: PathBuf,
    /// Where PDFs printed through the viewer land.
    pub print_dir: PathBuf,
    /// Destinations matching this pattern print via an intermediate PDF.
    pub print_via_pdf_pattern: Option<Regex>,
    /// Scale oversized list jobs down during conversion.
    pub scale_lists: bool,
}

/// The job-processing worker.
pub struct JobHandler<P: PrinterAdapter> {
    dispatcher: Dispatcher<P>,
    pdf: PdfPipeline,
    config: HandlerConfig,
    error_hook: Option<ErrorHook>,
}

impl<P: PrinterAdapter> JobHandler<P> {
    pub fn new(dispatcher: Dispatcher<P>, pdf: PdfPipeline, config: HandlerConfig) -> Self {
        Self {
            dispatcher,
            pdf,
            config,
            error_hook: None,
        }
    }

    /// Install a hook for user-visible per-job errors.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    /// Consume jobs until the channel closes or `shutdown` fires.
    pub async fn run(self, mut jobs: mpsc::Receiver<Arc<Job>>, shutdown: Arc<Notify>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => return,

                job = jobs.recv() => {
                    let Some(job) = job else { return };
                    if let Err(e) = self.process(&job).await {
                        tracing::error!(job = %job.name, error = %e, "abandoning job");
                        if let Some(hook) = &self.error_hook {
                            hook(&format!("job {}: {}", job.name, e));
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, job: &Job) -> Result<(), HandlerError> {
        tracing::info!(job = %job.name, printer = %job.printer(), "processing job");

        let meta = fs::metadata(&job.capture_path)?;
        pcl::check_size(meta.len())?;

        let data = fs::read(&job.capture_path)?;
        let analysis = pcl::analyze(&data)?;
        tracing::debug!(
            job = %job.name,
            has_pjl = analysis.has_pjl,
            orientation = %analysis.orientation,
            job_type = ?analysis.job_type,
            "analysed job"
        );

        let clean = pcl::sanitize(&data);
        if clean != data {
            fs::write(&job.capture_path, &clean)?;
        }

        let needs_scaling = self.config.scale_lists && analysis.job_type == pcl::JobType::List;
        let mode = select_mode(
            job.printer(),
            job.options.print_via_pdf,
            self.config.print_via_pdf_pattern.as_ref(),
        );
        tracing::info!(job = %job.name, mode = ?mode, "delivering job");

        match mode {
            DeliveryMode::ShowPdf => {
                let pdf = self
                    .pdf
                    .create_pdf(&job.capture_path, &self.config.pdf_dir, &job.time, needs_scaling)
                    .await?;
                self.dispatcher.show_pdf(&pdf)?;
            }
            DeliveryMode::ChoosePrinter => {
                let pdf = self
                    .pdf
                    .create_pdf(
                        &job.capture_path,
                        &self.config.print_dir,
                        &job.time,
                        needs_scaling,
                    )
                    .await?;
                self.dispatcher
                    .print_pdf_select_printer(&job.capture_path, &pdf)
                    .await?;
            }
            DeliveryMode::PrintViaPdf => {
                let pdf = self
                    .pdf
                    .create_pdf(
                        &job.capture_path,
                        &self.config.print_dir,
                        &job.time,
                        needs_scaling,
                    )
                    .await?;
                self.dispatcher.print_pdf(job.printer(), &pdf).await?;
            }
            DeliveryMode::ForwardRaw => {
                let doc_name = job
                    .capture_path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| job.name.clone());
                if job.options.wrap {
                    let envelope = pcl::Envelope {
                        name: &job.name,
                        title: &job.name,
                        language: pcl::Language::Pcl,
                        duplex: job.options.duplex,
                        media_source: job.options.media_source.as_deref(),
                        orientation: (analysis.orientation == pcl::Orientation::Landscape)
                            .then_some(analysis.orientation),
                    };
                    self.dispatcher
                        .submit_wrapped(job.printer(), &doc_name, &envelope, &clean)
                        .await?;
                } else {
                    self.dispatcher
                        .forward_raw(job.printer(), &doc_name, clean)
                        .await?;
                }
            }
        }

        if let Err(e) = fs::remove_file(&job.capture_path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::debug!(file = %job.capture_path.display(), error = %e, "failed to remove capture file");
            }
        }
        tracing::info!(job = %job.name, "job complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
