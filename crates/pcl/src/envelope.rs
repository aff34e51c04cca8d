// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PJL job envelope for RAW printer submission.

use crate::analysis::Orientation;
use crate::markers::{NEWLINE, PJL_PREFIX, UEC};
use std::fmt;

/// Print language announced in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Pcl,
    Pdf,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::Pcl => "PCL",
            Language::Pdf => "PDF",
        };
        write!(f, "{}", s)
    }
}

/// PJL envelope written around a payload on RAW submission.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    /// Job name, also repeated in the closing `EOJ` line.
    pub name: &'a str,
    /// Display title shown on the printer panel.
    pub title: &'a str,
    pub language: Language,
    pub duplex: bool,
    /// PJL `SET MEDIASOURCE` value, e.g. `TRAY2`.
    pub media_source: Option<&'a str>,
    /// Explicit orientation; omitted when the stream decides.
    pub orientation: Option<Orientation>,
}

impl Envelope<'_> {
    /// Wrap `payload` in the envelope.
    pub fn wrap(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 256);

        out.extend_from_slice(PJL_PREFIX);
        out.extend_from_slice(NEWLINE);
        line(
            &mut out,
            format_args!(r#"@PJL JOB NAME = "{}" DISPLAY = "{}""#, self.name, self.title),
        );
        if let Some(source) = self.media_source {
            line(&mut out, format_args!("@PJL SET MEDIASOURCE = {}", source));
        }
        let duplex = if self.duplex { "ON" } else { "OFF" };
        line(&mut out, format_args!("@PJL SET DUPLEX = {}", duplex));
        if let Some(orientation) = self.orientation {
            line(
                &mut out,
                format_args!("@PJL SET ORIENTATION = {}", orientation),
            );
        }
        line(
            &mut out,
            format_args!("@PJL ENTER LANGUAGE = {}", self.language),
        );

        out.extend_from_slice(payload);

        out.extend_from_slice(PJL_PREFIX);
        out.extend_from_slice(NEWLINE);
        line(&mut out, format_args!("@PJL RESET"));
        line(&mut out, format_args!(r#"@PJL EOJ NAME = "{}""#, self.name));
        out.extend_from_slice(UEC);

        out
    }
}

fn line(out: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    out.extend_from_slice(args.to_string().as_bytes());
    out.extend_from_slice(NEWLINE);
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
