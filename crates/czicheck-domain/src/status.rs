//! Fail-safe string → enum resolvers for engine status and severity text.
//!
//! Neither resolver can fail: anything unrecognised collapses to the most
//! severe value.

use czicheck_types::{CheckStatus, Severity};

/// Case-insensitive match against `Ok`, `Warn` and `Fail`; anything else is `Fail`.
pub fn parse_status(text: Option<&str>) -> CheckStatus {
    let Some(text) = text else {
        return CheckStatus::Fail;
    };
    if text.eq_ignore_ascii_case("ok") {
        CheckStatus::Ok
    } else if text.eq_ignore_ascii_case("warn") {
        CheckStatus::Warn
    } else {
        CheckStatus::Fail
    }
}

/// Case-insensitive match against `Info` and `Warning`; `fatal` and anything
/// unrecognised is `Error`.
pub fn parse_severity(text: Option<&str>) -> Severity {
    let Some(text) = text else {
        return Severity::Error;
    };
    if text.eq_ignore_ascii_case("info") {
        Severity::Info
    } else if text.eq_ignore_ascii_case("warning") {
        Severity::Warning
    } else {
        // "fatal" is the engine's spelling of an error.
        Severity::Error
    }
}
