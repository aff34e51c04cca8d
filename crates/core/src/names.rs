// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp-derived artefact names.
//!
//! Job capture files and PDF printouts carry deterministic names derived
//! from the instant the job started spooling, so files sort chronologically
//! in the spool and output directories.

use chrono::{DateTime, Local};

/// Name of a print job started at `time`: `pj-YYMMDD-HHMMSS`.
///
/// The capture file for the job is `<job_name>.txt` next to the spool file.
pub fn job_name(time: &DateTime<Local>) -> String {
    time.format("pj-%y%m%d-%H%M%S").to_string()
}

/// File name of the PDF rendition of a job started at `time`:
/// `Printout YYYY-MM-DD HHMMSS.pdf`.
pub fn pdf_name(time: &DateTime<Local>) -> String {
    time.format("Printout %Y-%m-%d %H%M%S.pdf").to_string()
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
