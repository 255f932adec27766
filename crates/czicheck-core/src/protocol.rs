//! Two-phase, size-negotiated calls into a [`ValidationEngine`].
//!
//! Every call goes through a [`ValidatorHandle`], which destroys the native
//! validator when dropped. Buffers are plain `Vec<u8>`s owned by this side.

use std::ffi::CStr;

use tracing::{debug, warn};

use czicheck_domain::{FileResult, file_result_from_payload};
use czicheck_types::Configuration;

use crate::checker::CheckerError;
use crate::engine::{RawHandle, ValidationEngine};

pub const STATUS_SUCCESS: i32 = 0;
pub const STATUS_FILE_ACCESS: i32 = 2;
pub const STATUS_INVALID_HANDLE: i32 = 3;

pub const FILE_ACCESS_MESSAGE: &str = "File access error: Could not open or read the CZI file.";

/// Largest buffer the fill phase will allocate for either output (256 MiB).
pub const MAX_BUFFER_SIZE: u64 = 256 * 1024 * 1024;

/// Buffer sizes requested by the engine in the query phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferSizes {
    pub json: u64,
    pub error: usize,
}

/// What the fill phase produced, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    pub code: i32,
    pub json: Option<String>,
    pub error: Option<String>,
}

impl RawReport {
    /// Classify the engine status and decode the payload.
    pub fn into_file_result(self, file: &str) -> FileResult {
        match self.code {
            STATUS_SUCCESS => {
                file_result_from_payload(file, self.json.as_deref(), self.error.as_deref())
            }
            STATUS_FILE_ACCESS => {
                warn!(file, "engine could not access file");
                FileResult::failed(file, self.error.as_deref().unwrap_or(FILE_ACCESS_MESSAGE))
            }
            code => {
                warn!(file, code, "engine reported an unclassified error");
                FileResult::failed(
                    file,
                    format!(
                        "Validation failed with error code {code}. {}",
                        self.error.as_deref().unwrap_or_default()
                    ),
                )
            }
        }
    }
}

/// Owns one native validator for the duration of a single validation.
pub struct ValidatorHandle<'e> {
    engine: &'e dyn ValidationEngine,
    raw: RawHandle,
}

impl<'e> ValidatorHandle<'e> {
    pub fn create(
        engine: &'e dyn ValidationEngine,
        config: &Configuration,
    ) -> Result<Self, CheckerError> {
        let raw = engine
            .create_validator(config)
            .ok_or(CheckerError::CreateValidator)?;
        debug!(handle = raw.get(), "validator created");
        Ok(Self { engine, raw })
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Query phase: absent buffers, zero sizes.
    pub fn query(&self, path: &CStr) -> Result<BufferSizes, CheckerError> {
        let mut sizes = BufferSizes::default();
        let code = self.engine.validate_file(
            self.raw,
            path,
            None,
            &mut sizes.json,
            None,
            &mut sizes.error,
        );
        if code == STATUS_INVALID_HANDLE {
            return Err(CheckerError::InvalidHandle);
        }
        debug!(code, json = sizes.json, error = sizes.error, "negotiated buffer sizes");
        Ok(sizes)
    }

    /// Fill phase: buffers of exactly the requested sizes; a zero size
    /// allocates and passes nothing. Sizes above [`MAX_BUFFER_SIZE`] are
    /// refused before anything is allocated.
    pub fn fill(&self, path: &CStr, requested: BufferSizes) -> Result<RawReport, CheckerError> {
        let json_len = checked_len(requested.json)?;
        let error_len = checked_len(requested.error as u64)?;
        let mut json_buf = vec![0u8; json_len];
        let mut error_buf = vec![0u8; error_len];

        let mut sizes = requested;
        let code = self.engine.validate_file(
            self.raw,
            path,
            non_empty(&mut json_buf),
            &mut sizes.json,
            non_empty(&mut error_buf),
            &mut sizes.error,
        );
        if code == STATUS_INVALID_HANDLE {
            return Err(CheckerError::InvalidHandle);
        }

        let json_used = usize::try_from(sizes.json).unwrap_or(usize::MAX);
        Ok(RawReport {
            code,
            json: buffer_to_string(&json_buf, json_used),
            error: buffer_to_string(&error_buf, sizes.error),
        })
    }
}

impl Drop for ValidatorHandle<'_> {
    fn drop(&mut self) {
        self.engine.destroy_validator(self.raw);
        debug!(handle = self.raw.get(), "validator destroyed");
    }
}

/// Create a validator, negotiate, fill and decode. The validator is destroyed
/// on every path out of this function.
pub fn run_validation(
    engine: &dyn ValidationEngine,
    config: &Configuration,
    path: &CStr,
    file: &str,
) -> Result<FileResult, CheckerError> {
    let handle = ValidatorHandle::create(engine, config)?;
    let sizes = handle.query(path)?;
    let report = handle.fill(path, sizes)?;
    Ok(report.into_file_result(file))
}

/// Two-phase version string query; `None` if the engine declines.
pub fn query_version_string(engine: &dyn ValidationEngine) -> Option<String> {
    let mut size = 0u64;
    engine.version_string(None, &mut size);
    let len = checked_len(size).ok().filter(|len| *len > 0)?;

    let mut buf = vec![0u8; len];
    if !engine.version_string(Some(buf.as_mut_slice()), &mut size) {
        return None;
    }
    buffer_to_string(&buf, len)
}

fn checked_len(size: u64) -> Result<usize, CheckerError> {
    match usize::try_from(size) {
        Ok(len) if size <= MAX_BUFFER_SIZE => Ok(len),
        _ => {
            warn!(size, "engine requested an oversized buffer");
            Err(CheckerError::BufferTooLarge { size })
        }
    }
}

fn non_empty(buf: &mut [u8]) -> Option<&mut [u8]> {
    if buf.is_empty() {
        None
    } else {
        Some(buf)
    }
}

/// Text up to the first NUL within the first `used` bytes; `None` when no
/// bytes were used. Invalid UTF-8 is replaced rather than rejected.
fn buffer_to_string(buf: &[u8], used: usize) -> Option<String> {
    let used = &buf[..used.min(buf.len())];
    if used.is_empty() {
        return None;
    }
    let end = used.iter().position(|b| *b == 0).unwrap_or(used.len());
    Some(String::from_utf8_lossy(&used[..end]).into_owned())
}
