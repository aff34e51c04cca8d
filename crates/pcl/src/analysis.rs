// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analysis of a captured print job.

use crate::markers;
use std::fmt;
use thiserror::Error;

/// Hard ceiling on the size of a captured job (8 MiB should be plenty).
pub const MAX_JOB_SIZE: u64 = 8 * (1 << 20);

/// Errors from job analysis
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("job is too large ({size} bytes, limit {limit}), try direct forwarding to the printer")]
    JobTooLarge { size: u64, limit: u64 },
    #[error("stream mixes landscape orientation with absolute positioning")]
    MixedOrientationAndPositioning,
}

/// Page orientation declared by the PCL stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    /// PJL spelling, as used in `@PJL SET ORIENTATION = …`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Portrait => "PORTRAIT",
            Orientation::Landscape => "LANDSCAPE",
        };
        write!(f, "{}", s)
    }
}

/// Kind of document the stream prints.
///
/// Absolute positioning on a portrait page marks an oversized list that
/// needs scaling down during PDF conversion; everything else is a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Form,
    List,
}

/// Result of analysing a captured byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    /// The first UEC is immediately followed by `@PJL`.
    pub has_pjl: bool,
    /// More than one UEC occurs in the stream.
    pub has_multiple_uec: bool,
    pub orientation: Orientation,
    pub job_type: JobType,
}

/// Reject capture files above the hard size ceiling.
pub fn check_size(size: u64) -> Result<(), ParseError> {
    if size > MAX_JOB_SIZE {
        return Err(ParseError::JobTooLarge {
            size,
            limit: MAX_JOB_SIZE,
        });
    }
    Ok(())
}

/// Analyse a captured byte stream.
///
/// Fails with [`ParseError::MixedOrientationAndPositioning`] when absolute
/// positioning occurs together with a landscape command; the two cannot be
/// honoured at the same time when the stream is re-emitted.
pub fn analyze(data: &[u8]) -> Result<Analysis, ParseError> {
    let first_uec = markers::find(data, markers::UEC, 0);
    let has_pjl = first_uec.is_some_and(|i| data[i..].starts_with(markers::PJL_PREFIX));
    let has_multiple_uec = first_uec
        .is_some_and(|i| markers::find(data, markers::UEC, i + markers::UEC.len()).is_some());

    let mut landscape = false;
    let mut positioning = false;
    let mut i = 0;
    while i < data.len() {
        if data[i] == 0x1b {
            if let Some(len) = markers::landscape_len(data, i) {
                landscape = true;
                i += len;
                continue;
            }
            if let Some(len) = markers::positioning_len(data, i) {
                positioning = true;
                i += len;
                continue;
            }
        }
        i += 1;
    }

    let job_type = if positioning {
        if landscape {
            return Err(ParseError::MixedOrientationAndPositioning);
        }
        JobType::List
    } else {
        JobType::Form
    };

    Ok(Analysis {
        has_pjl,
        has_multiple_uec,
        orientation: if landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        },
        job_type,
    })
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
