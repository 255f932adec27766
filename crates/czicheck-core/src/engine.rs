//! The narrow call surface of the native validation engine.

use std::ffi::CStr;
use std::num::NonZeroUsize;

use czicheck_types::Configuration;

/// Opaque, non-null validator handle issued by [`ValidationEngine::create_validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    /// `None` for the null handle.
    pub fn new(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(RawHandle)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// The five entry points of `libczicheckc`.
///
/// Buffers follow the engine's size-negotiation convention: a call with
/// absent buffers writes the required sizes (including the trailing NUL) to
/// `json_size` / `error_size`; a call with buffers of at least those sizes
/// fills them and writes back the sizes actually used.
pub trait ValidationEngine: Send + Sync {
    /// `None` when the engine rejects the configuration.
    fn create_validator(&self, config: &Configuration) -> Option<RawHandle>;

    /// Returns the engine status code (`0` success, `2` file access error,
    /// `3` invalid handle, anything else unclassified).
    fn validate_file(
        &self,
        handle: RawHandle,
        path: &CStr,
        json: Option<&mut [u8]>,
        json_size: &mut u64,
        error: Option<&mut [u8]>,
        error_size: &mut usize,
    ) -> i32;

    fn destroy_validator(&self, handle: RawHandle);

    /// `(major, minor, patch)`, or `None` when the engine cannot tell.
    fn version(&self) -> Option<(i32, i32, i32)>;

    /// Two-phase version string query; `false` when the buffer is absent or
    /// too small, with the required size written to `size`.
    fn version_string(&self, buffer: Option<&mut [u8]>, size: &mut u64) -> bool;
}
