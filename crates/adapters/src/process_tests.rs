// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn safe_arguments_stay_unquoted() {
    for arg in [
        "-dBATCH",
        "-sDEVICE=pdfwrite",
        "-dNumCopies=1",
        r"c:\ghostpcl\gpcl6win32.exe",
        "a-zA-Z0-9_=/.,:;%()?+*~",
    ] {
        assert!(!needs_quoting(arg), "{arg:?} should be safe");
        assert_eq!(escape_argument(arg), arg);
    }
}

#[test]
fn arguments_with_problematic_characters_are_quoted() {
    for arg in [
        "with space",
        r"c:\Program Files\viewer.exe",
        "/print:default&showui=no",
        "name\"quoted\"",
        "umlaut-ä",
    ] {
        assert!(needs_quoting(arg), "{arg:?} should need quoting");
        assert_eq!(escape_argument(arg), format!("\"{}\"", arg));
    }
}

#[test]
fn cmdline_is_space_joined() {
    let args = ["-dBATCH", "-sOutputFile=out.pdf", "in file.txt"];
    assert_eq!(
        build_cmdline(&args),
        "-dBATCH -sOutputFile=out.pdf \"in file.txt\""
    );
}

#[cfg(unix)]
#[tokio::test]
async fn tool_output_is_returned_within_the_deadline() {
    let cmd = command_with_cmdline(Path::new("echo"), &["hello"]);
    let output = run_tool_with_deadline(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn missing_tool_is_named_in_the_error() {
    let cmd = command_with_cmdline(Path::new("definitely-not-a-binary"), &["x"]);
    let err = run_tool_with_deadline(cmd, Duration::from_secs(1), "missing tool")
        .await
        .unwrap_err();
    assert!(err.contains("missing tool"));
    assert!(err.contains("could not be started"));
}

#[cfg(unix)]
#[tokio::test]
async fn overrunning_tool_is_cut_off_at_the_deadline() {
    let cmd = command_with_cmdline(Path::new("sleep"), &["5"]);
    let err = run_tool_with_deadline(cmd, Duration::from_millis(50), "sleep")
        .await
        .unwrap_err();
    assert!(err.contains("did not finish"));
}
