//! A scripted, in-process [`ValidationEngine`].
//!
//! `FakeEngine` follows the native size-negotiation convention (sizes include
//! the trailing NUL) and records every call so tests can assert on handle
//! lifetimes and on the buffers that were passed.

use std::collections::HashSet;
use std::ffi::CStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use czicheck_core::{RawHandle, STATUS_INVALID_HANDLE, STATUS_SUCCESS, ValidationEngine};
use czicheck_types::Configuration;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Create {
        config: Configuration,
    },
    Validate {
        handle: usize,
        path: String,
        /// Length of the JSON buffer passed, `None` if absent.
        json_buffer: Option<usize>,
        json_size_in: u64,
        /// Length of the error buffer passed, `None` if absent.
        error_buffer: Option<usize>,
        error_size_in: usize,
    },
    Destroy {
        handle: usize,
    },
}

impl EngineCall {
    /// True for a validate call that passed no buffers.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            EngineCall::Validate {
                json_buffer: None,
                error_buffer: None,
                ..
            }
        )
    }
}

#[derive(Debug, Clone)]
struct Script {
    refuse_create: bool,
    query_code: Option<i32>,
    query_sizes: Option<(u64, usize)>,
    code: i32,
    json: Option<String>,
    error: Option<String>,
    version: Option<(i32, i32, i32)>,
    version_string: Option<String>,
}

#[derive(Debug)]
pub struct FakeEngine {
    script: Script,
    calls: Mutex<Vec<EngineCall>>,
    live: Mutex<HashSet<usize>>,
    next_handle: AtomicUsize,
    creates: AtomicUsize,
    destroys: AtomicUsize,
    stray_destroys: AtomicUsize,
}

impl FakeEngine {
    /// Answers every validation with `code`, `json` and `error`.
    pub fn new(code: i32, json: Option<&str>, error: Option<&str>) -> Self {
        Self {
            script: Script {
                refuse_create: false,
                query_code: None,
                query_sizes: None,
                code,
                json: json.map(str::to_string),
                error: error.map(str::to_string),
                version: None,
                version_string: None,
            },
            calls: Mutex::new(Vec::new()),
            live: Mutex::new(HashSet::new()),
            next_handle: AtomicUsize::new(0x1000),
            creates: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            stray_destroys: AtomicUsize::new(0),
        }
    }

    /// Status `0` with `json` as the report.
    pub fn succeeding(json: &str) -> Self {
        Self::new(STATUS_SUCCESS, Some(json), None)
    }

    /// `create_validator` returns the null handle.
    pub fn refusing_create(mut self) -> Self {
        self.script.refuse_create = true;
        self
    }

    /// Status returned by the query phase only; the fill phase keeps the
    /// scripted code.
    pub fn with_query_code(mut self, code: i32) -> Self {
        self.script.query_code = Some(code);
        self
    }

    /// Sizes reported by the query phase instead of the scripted texts' sizes.
    pub fn with_query_sizes(mut self, json: u64, error: usize) -> Self {
        self.script.query_sizes = Some((json, error));
        self
    }

    pub fn with_version(mut self, major: i32, minor: i32, patch: i32) -> Self {
        self.script.version = Some((major, minor, patch));
        self
    }

    pub fn with_version_string(mut self, version: &str) -> Self {
        self.script.version_string = Some(version.to_string());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    /// Destroy calls for handles that were not live (double destroy or forged).
    pub fn stray_destroys(&self) -> usize {
        self.stray_destroys.load(Ordering::SeqCst)
    }

    pub fn live_handles(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or_default()
    }

    fn record(&self, call: EngineCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn is_live(&self, handle: RawHandle) -> bool {
        self.live
            .lock()
            .map(|l| l.contains(&handle.get()))
            .unwrap_or(false)
    }
}

/// `text` plus its NUL terminator; empty when absent.
fn c_bytes(text: Option<&str>) -> Vec<u8> {
    match text {
        Some(t) => {
            let mut bytes = t.as_bytes().to_vec();
            bytes.push(0);
            bytes
        }
        None => Vec::new(),
    }
}

/// Copy as much of `src` as fits and return the number of bytes written.
fn copy_into(dst: Option<&mut [u8]>, src: &[u8]) -> usize {
    match dst {
        Some(buf) if !src.is_empty() => {
            let n = buf.len().min(src.len());
            buf[..n].copy_from_slice(&src[..n]);
            n
        }
        _ => 0,
    }
}

impl ValidationEngine for FakeEngine {
    fn create_validator(&self, config: &Configuration) -> Option<RawHandle> {
        self.record(EngineCall::Create { config: *config });
        if self.script.refuse_create {
            return None;
        }
        let handle = RawHandle::new(self.next_handle.fetch_add(0x10, Ordering::SeqCst))?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut live) = self.live.lock() {
            live.insert(handle.get());
        }
        Some(handle)
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
        let is_query = json.is_none() && error.is_none();
        self.record(EngineCall::Validate {
            handle: handle.get(),
            path: path.to_string_lossy().into_owned(),
            json_buffer: json.as_ref().map(|b| b.len()),
            json_size_in: *json_size,
            error_buffer: error.as_ref().map(|b| b.len()),
            error_size_in: *error_size,
        });

        if !self.is_live(handle) {
            return STATUS_INVALID_HANDLE;
        }

        let json_bytes = c_bytes(self.script.json.as_deref());
        let error_bytes = c_bytes(self.script.error.as_deref());

        if is_query {
            let (json_needed, error_needed) = self
                .script
                .query_sizes
                .unwrap_or((json_bytes.len() as u64, error_bytes.len()));
            *json_size = json_needed;
            *error_size = error_needed;
            return self.script.query_code.unwrap_or(self.script.code);
        }

        *json_size = copy_into(json, &json_bytes) as u64;
        *error_size = copy_into(error, &error_bytes);
        self.script.code
    }

    fn destroy_validator(&self, handle: RawHandle) {
        self.record(EngineCall::Destroy {
            handle: handle.get(),
        });
        let removed = self
            .live
            .lock()
            .map(|mut l| l.remove(&handle.get()))
            .unwrap_or(false);
        if removed {
            self.destroys.fetch_add(1, Ordering::SeqCst);
        } else {
            self.stray_destroys.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn version(&self) -> Option<(i32, i32, i32)> {
        self.script.version
    }

    fn version_string(&self, buffer: Option<&mut [u8]>, size: &mut u64) -> bool {
        let bytes = c_bytes(self.script.version_string.as_deref());
        if bytes.is_empty() {
            *size = 0;
            return false;
        }
        match buffer {
            Some(buf) if buf.len() >= bytes.len() => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                *size = bytes.len() as u64;
                true
            }
            _ => {
                *size = bytes.len() as u64;
                false
            }
        }
    }
}
