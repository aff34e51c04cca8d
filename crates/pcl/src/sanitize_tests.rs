// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::analysis::{analyze, JobType, Orientation};

const UEC: &[u8] = b"\x1b%-12345X";

#[test]
fn stream_without_markers_is_unchanged() {
    let data = b"plain PCL payload \x1b(s12H with unrelated escapes";
    assert_eq!(sanitize(data), data);
}

#[test]
fn removes_envelope_landscape_and_duplex() {
    // Wrapped landscape job with an explicit duplex selection.
    let data = [
        UEC,
        b"@PJL ENTER LANGUAGE = PCL\r\n",
        b"\x1b&l1O\r\n",
        b"\x1b&l2S\r\n",
        b"payload",
        UEC,
    ]
    .concat();
    let expected = [b"payload".as_slice(), UEC].concat();

    let a = analyze(&data).unwrap();
    assert_eq!(a.orientation, Orientation::Landscape);
    assert_eq!(a.job_type, JobType::Form);
    assert_eq!(sanitize(&data), expected);
}

#[test]
fn removes_every_envelope_block() {
    let block = [UEC, b"@PJL JOB\r\n@PJL ENTER LANGUAGE = PCL\r\n"].concat();
    let data = [block.as_slice(), b"one", block.as_slice(), b"two"].concat();
    assert_eq!(sanitize(&data), b"onetwo");
}

#[test]
fn bare_trailing_uec_survives() {
    let data = [b"payload".as_slice(), UEC].concat();
    assert_eq!(sanitize(&data), data);
}

#[test]
fn idempotent() {
    let data = [
        UEC,
        b"@PJL ENTER LANGUAGE = PCL\r\n",
        b"\x1b&l1O\r\n",
        b"body",
        UEC,
    ]
    .concat();
    let once = sanitize(&data);
    assert_eq!(sanitize(&once), once);
}

#[test]
fn idempotent_when_removal_splices_a_command() {
    // Removing the duplex command joins the halves into a landscape
    // command; a single pass would leave it behind.
    let data = b"\x1b&l1\x1b&l2S\r\nO\r\n";
    let once = sanitize(data);
    assert_eq!(sanitize(&once), once);
    assert_eq!(once, b"");
}
