//! Decoding of the engine's JSON report into a [`FileResult`].

use czicheck_types::{Finding, FindingDto, ReportDto, TestEntryDto};

use crate::checks::check_from_name;
use crate::results::{CheckResult, CheckResultError, FileResult};
use crate::status::{parse_severity, parse_status};

/// Diagnostic used when the engine produced neither a payload nor error text.
pub const NO_OUTPUT_MESSAGE: &str = "No output received from validation.";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("report is empty")]
    Empty,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("tests[{index}]: unknown check '{name}'")]
    UnknownCheck { index: usize, name: String },

    #[error("tests[{index}]: {source}")]
    CheckResult {
        index: usize,
        #[source]
        source: CheckResultError,
    },
}

/// Parse report text into its DTO. A JSON `null` document counts as empty.
pub fn parse_report(text: &str) -> Result<ReportDto, DecodeError> {
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let report: Option<ReportDto> = serde_json::from_str(text)?;
    report.ok_or(DecodeError::Empty)
}

/// Convert a parsed report into a result for `file`.
///
/// The file status comes from `overallResult` through the fail-safe status
/// resolver; every entry's check name must resolve to exactly one check.
pub fn report_to_file_result(
    report: &ReportDto,
    file: &str,
) -> Result<FileResult, DecodeError> {
    let check_results = report
        .tests
        .iter()
        .enumerate()
        .map(|(index, entry)| entry_to_check_result(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let result = FileResult::new(
        file,
        parse_status(report.overall_result.as_deref()),
        check_results,
    );

    Ok(match report
        .output_version
        .as_ref()
        .and_then(|v| v.version.as_deref())
    {
        Some(version) => result.with_version(version),
        None => result,
    })
}

/// Parse and convert in one step.
pub fn decode_report(text: &str, file: &str) -> Result<FileResult, DecodeError> {
    let report = parse_report(text)?;
    report_to_file_result(&report, file)
}

/// Turn whatever the engine returned for a successful call into a result.
///
/// Never fails: an absent payload yields the engine diagnostic (or
/// [`NO_OUTPUT_MESSAGE`]); an undecodable payload yields a failed result whose
/// diagnostic carries the decode error and the raw text. Engine diagnostics
/// accompanying a good payload are kept on the result.
pub fn file_result_from_payload(
    file: &str,
    payload: Option<&str>,
    diagnostic: Option<&str>,
) -> FileResult {
    let payload = payload.filter(|p| !p.trim().is_empty());
    let Some(raw) = payload else {
        return FileResult::failed(file, diagnostic.unwrap_or(NO_OUTPUT_MESSAGE));
    };

    match decode_report(raw, file) {
        Ok(result) => match diagnostic {
            Some(diag) => result.with_diagnostic(diag),
            None => result,
        },
        Err(DecodeError::Empty) => {
            FileResult::failed(file, diagnostic.unwrap_or(NO_OUTPUT_MESSAGE))
        }
        Err(err) => FileResult::failed(
            file,
            format!("Failed to parse JSON output: {err}\nRaw output: {raw}"),
        ),
    }
}

fn entry_to_check_result(index: usize, entry: &TestEntryDto) -> Result<CheckResult, DecodeError> {
    let check = check_from_name(&entry.check).ok_or_else(|| DecodeError::UnknownCheck {
        index,
        name: entry.check.clone(),
    })?;

    let findings: Vec<Finding> = entry.findings.iter().map(finding_from_dto).collect();

    CheckResult::new(
        check,
        entry.description.as_str(),
        parse_status(entry.status.as_deref()),
        findings,
    )
    .map_err(|source| DecodeError::CheckResult { index, source })
}

fn finding_from_dto(dto: &FindingDto) -> Finding {
    Finding::new(
        parse_severity(dto.severity.as_deref()),
        dto.description.as_str(),
        dto.details.as_str(),
    )
}
