// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production DOS-device binder on top of `DefineDosDeviceW`.

use super::{add_long_path_prefix, BinderError, DeviceBinder};
use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use winapi::shared::winerror::ERROR_FILE_NOT_FOUND;
use winapi::um::fileapi::{DefineDosDeviceW, QueryDosDeviceW};
use winapi::um::winbase::{
    DDD_EXACT_MATCH_ON_REMOVE, DDD_NO_BROADCAST_SYSTEM, DDD_RAW_TARGET_PATH, DDD_REMOVE_DEFINITION,
};

/// Absolutise `path` and apply the `\\?\` long-path prefix.
pub fn normalize_long_path(path: &Path) -> io::Result<String> {
    let absolute = std::path::absolute(path)?;
    Ok(add_long_path_prefix(&absolute.to_string_lossy()))
}

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

/// Binder backed by the kernel DOS-device table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DosDeviceBinder;

impl DosDeviceBinder {
    fn call_define(device: &str, target: &str, flags: u32) -> io::Result<()> {
        let device_w = to_wide(device);
        let target_w = to_wide(target);
        let ok = unsafe { DefineDosDeviceW(flags, device_w.as_ptr(), target_w.as_ptr()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl DeviceBinder for DosDeviceBinder {
    fn define(&self, device: &str, target: &str) -> Result<(), BinderError> {
        tracing::debug!(device, target, "defining DOS device");
        Self::call_define(device, target, DDD_RAW_TARGET_PATH | DDD_NO_BROADCAST_SYSTEM).map_err(
            |source| BinderError::Define {
                device: device.to_string(),
                source,
            },
        )
    }

    fn remove(&self, device: &str, target: &str) -> Result<(), BinderError> {
        tracing::debug!(device, target, "removing DOS device");
        Self::call_define(
            device,
            target,
            DDD_RAW_TARGET_PATH | DDD_REMOVE_DEFINITION | DDD_EXACT_MATCH_ON_REMOVE,
        )
        .map_err(|source| BinderError::Remove {
            device: device.to_string(),
            source,
        })
    }

    fn query(&self, device: &str) -> Result<Vec<String>, BinderError> {
        let device_w = to_wide(device);
        let mut buf = vec![0u16; 2048];
        let len = unsafe {
            QueryDosDeviceW(device_w.as_ptr(), buf.as_mut_ptr(), buf.len() as u32)
        };
        if len == 0 {
            let source = io::Error::last_os_error();
            if source.raw_os_error() == Some(ERROR_FILE_NOT_FOUND as i32) {
                return Ok(Vec::new());
            }
            return Err(BinderError::Query {
                device: device.to_string(),
                source,
            });
        }

        // The buffer holds NUL-separated target strings with a final
        // double NUL.
        let mut targets = Vec::new();
        let mut start = 0;
        for (i, &w) in buf[..len as usize].iter().enumerate() {
            if w == 0 {
                if i > start {
                    targets.push(String::from_utf16_lossy(&buf[start..i]));
                }
                start = i + 1;
            }
        }
        tracing::trace!(device, ?targets, "queried DOS device");
        Ok(targets)
    }
}
