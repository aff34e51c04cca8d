// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raising the PDF viewer's print dialog.
//!
//! Windows opens the dialog below the calling application's window, and
//! with the viewer UI suppressed there is no task-bar entry either.
//! `SetForegroundWindow` is restricted (it steals focus), so the dialog is
//! forced topmost instead — very visible, no focus change.

use winapi::shared::minwindef::{BOOL, LPARAM};
use winapi::shared::windef::HWND;
use winapi::um::winuser::{
    EnumWindows, GetWindowTextW, SetWindowPos, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE,
};

struct EnumState<'a> {
    fragment: &'a str,
    found: bool,
}

unsafe extern "system" fn raise_matching(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let state = &mut *(lparam as *mut EnumState);
    let mut buf = [0u16; 512];
    let len = GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32);
    if len > 0 {
        let title = String::from_utf16_lossy(&buf[..len as usize]);
        if title.contains(state.fragment) {
            SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
            state.found = true;
            return 0;
        }
    }
    1
}

/// Enumerate top-level windows once and raise the first one whose title
/// contains `fragment` to topmost. Returns whether a window was found.
pub fn raise_window_containing(fragment: &str) -> bool {
    let mut state = EnumState {
        fragment,
        found: false,
    };
    unsafe {
        EnumWindows(Some(raise_matching), &mut state as *mut _ as LPARAM);
    }
    state.found
}
