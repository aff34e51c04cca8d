// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production printer adapter on top of winspool.

use super::{PrinterAdapter, PrinterError};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use winapi::shared::minwindef::{BYTE, DWORD};
use winapi::um::winnt::{HANDLE, LPWSTR};
use winapi::um::winspool::{
    ClosePrinter, EndDocPrinter, EndPagePrinter, OpenPrinterW, StartDocPrinterW, StartPagePrinter,
    WritePrinter, DOC_INFO_1W,
};

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

/// Open printer handle, closed on drop.
struct PrinterHandle {
    handle: HANDLE,
}

impl PrinterHandle {
    fn open(printer: &str) -> io::Result<Self> {
        let name = to_wide(printer);
        let mut handle = ptr::null_mut();
        let ok = unsafe { OpenPrinterW(name.as_ptr() as LPWSTR, &mut handle, ptr::null_mut()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }
}

impl Drop for PrinterHandle {
    fn drop(&mut self) {
        unsafe { ClosePrinter(self.handle) };
    }
}

fn send_document(printer: &str, doc_name: &str, data: &[u8]) -> Result<(), PrinterError> {
    let handle = PrinterHandle::open(printer).map_err(|e| PrinterError::Open {
        printer: printer.to_string(),
        message: e.to_string(),
    })?;

    let write_err = |e: io::Error| PrinterError::Write {
        printer: printer.to_string(),
        message: e.to_string(),
    };

    let doc_name = to_wide(doc_name);
    let datatype = to_wide("RAW");
    let doc_info = DOC_INFO_1W {
        pDocName: doc_name.as_ptr() as LPWSTR,
        pOutputFile: ptr::null_mut(),
        pDatatype: datatype.as_ptr() as LPWSTR,
    };

    unsafe {
        let job_id = StartDocPrinterW(handle.handle, 1, &doc_info as *const _ as *mut BYTE);
        if job_id <= 0 {
            return Err(write_err(io::Error::last_os_error()));
        }

        if StartPagePrinter(handle.handle) == 0 {
            let err = io::Error::last_os_error();
            EndDocPrinter(handle.handle);
            return Err(write_err(err));
        }

        let mut offset = 0;
        while offset < data.len() {
            let mut written: DWORD = 0;
            let ok = WritePrinter(
                handle.handle,
                data[offset..].as_ptr() as *mut _,
                (data.len() - offset) as DWORD,
                &mut written,
            );
            if ok == 0 {
                let err = io::Error::last_os_error();
                EndPagePrinter(handle.handle);
                EndDocPrinter(handle.handle);
                return Err(write_err(err));
            }
            offset += written as usize;
        }

        if EndPagePrinter(handle.handle) == 0 || EndDocPrinter(handle.handle) == 0 {
            return Err(write_err(io::Error::last_os_error()));
        }
    }

    Ok(())
}

/// Printer adapter backed by the winspool API.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinspoolPrinter;

#[async_trait]
impl PrinterAdapter for WinspoolPrinter {
    async fn submit_raw(
        &self,
        printer: &str,
        doc_name: &str,
        data: Vec<u8>,
    ) -> Result<(), PrinterError> {
        let printer_name = printer.to_string();
        let doc = doc_name.to_string();
        tracing::debug!(printer = %printer_name, doc = %doc, bytes = data.len(), "starting RAW document");

        let result = tokio::task::spawn_blocking({
            let printer_name = printer_name.clone();
            move || send_document(&printer_name, &doc, &data)
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(join) => Err(PrinterError::Write {
                printer: printer_name,
                message: join.to_string(),
            }),
        }
    }
}
