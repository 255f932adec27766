//! Domain logic: check-identifier resolution, status resolution, result
//! values and report decoding.
//!
//! This crate is I/O-free; the engine boundary lives in `czicheck-core`.

pub mod checks;
pub mod decode;
pub mod results;
pub mod status;

pub use checks::{ChecksParseError, check_from_name, parse_checks, resolve_checks, try_parse_checks};
pub use decode::{
    DecodeError, NO_OUTPUT_MESSAGE, decode_report, file_result_from_payload, parse_report,
    report_to_file_result,
};
pub use results::{CheckResult, CheckResultError, FileResult};
pub use status::{parse_severity, parse_status};
