// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn sample_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap()
}

fn pipeline(ghost_pcl: &str, ghost_script: &str) -> PdfPipeline {
    PdfPipeline {
        ghost_pcl: PathBuf::from(ghost_pcl),
        ghost_script: PathBuf::from(ghost_script),
        scaled_width: 221,
        scaled_height: 297,
        keep_unscaled: false,
    }
}

#[test]
fn intermediate_pdf_sits_next_to_the_input() {
    assert_eq!(
        unscaled_path(Path::new("/spool/pj-240307-140509.txt")),
        Path::new("/spool/pj-240307-140509-unscaled.pdf")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn pdf_path_is_derived_from_the_job_time() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pj-240307-140509.txt");
    std::fs::write(&input, b"data").unwrap();

    let pdf = pipeline("true", "true")
        .create_pdf(&input, dir.path(), &sample_time(), false)
        .await
        .unwrap();
    assert_eq!(
        pdf,
        dir.path().join("Printout 2024-03-07 140509.pdf")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn scaling_runs_both_converters() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pj-240307-140509.txt");
    std::fs::write(&input, b"data").unwrap();

    // Both tools are stand-ins that exit 0; the pipeline still sequences
    // the ghostscript pass and cleans up the intermediate.
    let pdf = pipeline("true", "true")
        .create_pdf(&input, dir.path(), &sample_time(), true)
        .await
        .unwrap();
    assert_eq!(pdf, dir.path().join("Printout 2024-03-07 140509.pdf"));
    assert!(!unscaled_path(&input).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn failing_converter_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pj-240307-140509.txt");
    std::fs::write(&input, b"data").unwrap();

    let err = pipeline("false", "false")
        .create_pdf(&input, dir.path(), &sample_time(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfError::ToolStatus { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn missing_converter_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pj-240307-140509.txt");
    std::fs::write(&input, b"data").unwrap();

    let err = pipeline("./does-not-exist-gpcl", "true")
        .create_pdf(&input, dir.path(), &sample_time(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfError::Tool { .. }));
}
