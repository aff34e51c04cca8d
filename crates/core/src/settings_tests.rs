// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn null_settings_returns_empty() {
    let s = NullSettings;
    s.set("printer", "Laser");
    assert_eq!(s.get("printer"), "");
}

#[test]
fn memory_settings_round_trip() {
    let s = MemorySettings::new();
    assert_eq!(s.get("printer"), "");
    s.set("printer", "Laser");
    assert_eq!(s.get("printer"), "Laser");
    s.set("printer", "PDF");
    assert_eq!(s.get("printer"), "PDF");
}
