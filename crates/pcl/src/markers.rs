// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bit-exact byte markers of the PCL/PJL stream and their scanners.

/// Universal Exit Command: separates language contexts in a PJL stream.
pub const UEC: &[u8] = b"\x1b%-12345X";

/// Start of a PJL block: UEC immediately followed by `@PJL`.
pub const PJL_PREFIX: &[u8] = b"\x1b%-12345X@PJL";

/// PJL commands are CRLF-terminated lines.
pub const NEWLINE: &[u8] = b"\r\n";

/// PCL landscape-orientation command including its line terminator.
const LANDSCAPE: &[u8] = b"\x1b&l1O\r\n";

/// Terminator of a PJL job envelope.
const ENTER_PCL: &[u8] = b"ENTER LANGUAGE = PCL\r\n";

/// First occurrence of `needle` in `data` at or after `from`.
pub(crate) fn find(data: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from + needle.len() > data.len() {
        return None;
    }
    data[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Length of the landscape command at `i`, if one starts there.
pub(crate) fn landscape_len(data: &[u8], i: usize) -> Option<usize> {
    data[i..].starts_with(LANDSCAPE).then_some(LANDSCAPE.len())
}

/// Length of a simplex/duplex command (`ESC&l[012]S` + CRLF) at `i`.
pub(crate) fn simplex_duplex_len(data: &[u8], i: usize) -> Option<usize> {
    let rest = &data[i..];
    if rest.len() < 7 {
        return None;
    }
    let matched = rest.starts_with(b"\x1b&l")
        && matches!(rest[3], b'0' | b'1' | b'2')
        && rest[4] == b'S'
        && rest[5..7] == *NEWLINE;
    matched.then_some(7)
}

/// Length of an absolute-positioning command
/// (`ESC*p<int>[.<frac>]x<int>[.<frac>]Y` + CRLF) at `i`.
pub(crate) fn positioning_len(data: &[u8], i: usize) -> Option<usize> {
    let rest = &data[i..];
    if !rest.starts_with(b"\x1b*p") {
        return None;
    }
    let mut pos = number_len(rest, 3)?;
    if rest.get(pos) != Some(&b'x') {
        return None;
    }
    pos = number_len(rest, pos + 1)?;
    if rest.get(pos) != Some(&b'Y') {
        return None;
    }
    pos += 1;
    rest[pos..].starts_with(NEWLINE).then_some(pos + 2)
}

/// Consume `<int>[.<frac>]` starting at `pos`, returning the index past it.
fn number_len(data: &[u8], pos: usize) -> Option<usize> {
    let mut end = pos;
    while data.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == pos {
        return None;
    }
    if data.get(end) == Some(&b'.') {
        let frac = end + 1;
        end = frac;
        while data.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end == frac {
            return None;
        }
    }
    Some(end)
}

/// Length of a PJL envelope block starting at `i`: UEC + `@PJL` through the
/// `ENTER LANGUAGE = PCL` line. The terminator is only searched up to the
/// next UEC so an unterminated envelope never swallows a following job.
pub(crate) fn envelope_len(data: &[u8], i: usize) -> Option<usize> {
    if !data[i..].starts_with(PJL_PREFIX) {
        return None;
    }
    let limit = find(data, UEC, i + UEC.len()).unwrap_or(data.len());
    let end = find(&data[..limit], ENTER_PCL, i + PJL_PREFIX.len())?;
    Some(end + ENTER_PCL.len() - i)
}

#[cfg(test)]
#[path = "markers_tests.rs"]
mod tests;
