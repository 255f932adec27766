//! Bindings to `libczicheckc`.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use czicheck_types::Configuration;

use crate::engine::{RawHandle, ValidationEngine};

#[link(name = "czicheckc")]
extern "C" {
    fn GetLibVersion(major: *mut i32, minor: *mut i32, patch: *mut i32);
    fn GetLibVersionString(buffer: *mut c_char, size: *mut u64) -> bool;
    fn CreateValidator(
        checks: u64,
        max_findings: i32,
        lax_parsing: bool,
        ignore_size_m: bool,
    ) -> *mut c_void;
    fn ValidateFile(
        validator: *mut c_void,
        path: *const c_char,
        json_buffer: *mut c_char,
        json_buffer_size: *mut u64,
        error_message: *mut c_char,
        error_message_length: *mut usize,
    ) -> c_int;
    fn DestroyValidator(validator: *mut c_void);
}

/// The linked native engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

fn buffer_ptr(buf: Option<&mut [u8]>) -> *mut c_char {
    buf.map_or(ptr::null_mut(), |b| b.as_mut_ptr().cast())
}

impl ValidationEngine for NativeEngine {
    fn create_validator(&self, config: &Configuration) -> Option<RawHandle> {
        // SAFETY: plain values in, opaque pointer out.
        let raw = unsafe {
            CreateValidator(
                config.checks.bits(),
                config.max_findings,
                config.lax_parsing,
                config.ignore_size_m,
            )
        };
        RawHandle::new(raw as usize)
    }

    fn validate_file(
        &self,
        handle: RawHandle,
        path: &CStr,
        json: Option<&mut [u8]>,
        json_size: &mut u64,
        error: Option<&mut [u8]>,
        error_size: &mut usize,
    ) -> i32 {
        // The engine writes at most `*json_size` / `*error_size` bytes, which
        // the caller sized to the buffers it passes.
        if let Some(buf) = json.as_deref() {
            *json_size = (*json_size).min(buf.len() as u64);
        }
        if let Some(buf) = error.as_deref() {
            *error_size = (*error_size).min(buf.len());
        }
        // SAFETY: handle came from CreateValidator and is still live; path is
        // NUL-terminated; buffers are either null or valid for the sizes given.
        unsafe {
            ValidateFile(
                handle.get() as *mut c_void,
                path.as_ptr(),
                buffer_ptr(json),
                json_size,
                buffer_ptr(error),
                error_size,
            )
        }
    }

    fn destroy_validator(&self, handle: RawHandle) {
        // SAFETY: called exactly once per handle by `ValidatorHandle::drop`.
        unsafe { DestroyValidator(handle.get() as *mut c_void) }
    }

    fn version(&self) -> Option<(i32, i32, i32)> {
        let (mut major, mut minor, mut patch) = (0, 0, 0);
        // SAFETY: three valid out-pointers.
        unsafe { GetLibVersion(&mut major, &mut minor, &mut patch) };
        Some((major, minor, patch))
    }

    fn version_string(&self, buffer: Option<&mut [u8]>, size: &mut u64) -> bool {
        if let Some(buf) = buffer.as_deref() {
            *size = (*size).min(buf.len() as u64);
        }
        // SAFETY: buffer is null or valid for `*size` bytes.
        unsafe { GetLibVersionString(buffer_ptr(buffer), size) }
    }
}
