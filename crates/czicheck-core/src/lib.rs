//! Core engine: drives the native validator through the two-phase call
//! protocol and turns its reports into result values.

mod checker;
mod engine;
#[cfg(feature = "native")]
mod native;
mod protocol;
mod render;

pub use checker::{CheckerError, CziChecker, UNKNOWN_VERSION};
pub use engine::{RawHandle, ValidationEngine};
#[cfg(feature = "native")]
pub use native::NativeEngine;
pub use protocol::{
    BufferSizes, FILE_ACCESS_MESSAGE, MAX_BUFFER_SIZE, RawReport, STATUS_FILE_ACCESS,
    STATUS_INVALID_HANDLE, STATUS_SUCCESS, ValidatorHandle, query_version_string, run_validation,
};
pub use render::{render_checks_table, render_json_for_results, render_text_for_result};

pub use tokio_util::sync::CancellationToken;
