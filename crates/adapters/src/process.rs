// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process command lines.
//!
//! The external converters parse their command line themselves and choke on
//! the default per-argument quoting of `CreateProcess` wrappers. The command
//! line is therefore composed as a single string — quoting exactly the
//! arguments that need it — and passed to the OS verbatim.

use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// An argument is safe to pass unquoted iff it consists entirely of
/// characters from `[-a-zA-Z0-9_=/.,:;%()?+*~\]`.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '_'
                | '='
                | '/'
                | '.'
                | ','
                | ':'
                | ';'
                | '%'
                | '('
                | ')'
                | '?'
                | '+'
                | '*'
                | '~'
                | '\\'
        )
}

/// Whether `arg` must be wrapped in double quotes on the command line.
pub fn needs_quoting(arg: &str) -> bool {
    arg.chars().any(|c| !is_safe_char(c))
}

/// Quote `arg` if it contains problematic characters.
pub fn escape_argument(arg: &str) -> String {
    if needs_quoting(arg) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Space-joined command line with every problematic argument quoted.
pub fn build_cmdline<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| escape_argument(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Command for `program` whose arguments reach the OS as the exact
/// command line produced by [`build_cmdline`].
#[cfg(windows)]
pub fn command_with_cmdline<S: AsRef<str>>(program: &Path, args: &[S]) -> Command {
    use std::os::windows::process::CommandExt;
    let mut cmd = std::process::Command::new(program);
    cmd.raw_arg(build_cmdline(args));
    Command::from(cmd)
}

/// Command for `program`; without `CreateProcess` command-line semantics the
/// arguments are passed through as-is.
#[cfg(not(windows))]
pub fn command_with_cmdline<S: AsRef<str>>(program: &Path, args: &[S]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|a| a.as_ref()));
    cmd
}

/// Run an external tool to completion, bounding how long it may hold the
/// job.
///
/// The converters occasionally wedge on malformed PCL input; the deadline
/// turns a hung child into an ordinary per-job failure. A child that
/// overruns it is killed when the tokio `Child` is dropped.
pub async fn run_tool_with_deadline(
    mut cmd: Command,
    deadline: Duration,
    tool: &str,
) -> Result<Output, String> {
    let run = cmd.output();
    match tokio::time::timeout(deadline, run).await {
        Err(_) => Err(format!(
            "{} did not finish within {}s",
            tool,
            deadline.as_secs()
        )),
        Ok(result) => result.map_err(|e| format!("{} could not be started: {}", tool, e)),
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
