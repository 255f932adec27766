//! Proptest strategies for generating valid test inputs.
//!
//! Strategies are constructive: every generated mask stays within
//! [`Checks::ALL`] and every generated report names known checks.
//!
//! # Bounds
//!
//! - Max findings per check result: 4
//! - Max check results per file: 16
//! - Max text length: 40 bytes

use czicheck_domain::{CheckResult, FileResult};
use czicheck_types::{
    CHECKS, CheckStatus, Checks, Configuration, Finding, FindingDto, OutputVersionDto, ReportDto,
    Severity, TestEntryDto,
};
use proptest::prelude::*;

pub const MAX_FINDINGS: usize = 4;
pub const MAX_CHECK_RESULTS: usize = 16;

// =============================================================================
// Flag Strategies
// =============================================================================

/// Any subset of the known checks, including the empty set.
pub fn arb_checks() -> impl Strategy<Value = Checks> {
    (0u64..=Checks::ALL.bits()).prop_map(Checks::from_bits)
}

/// Exactly one known check.
pub fn arb_single_check() -> impl Strategy<Value = Checks> {
    prop::sample::select(CHECKS.iter().map(|info| info.check).collect::<Vec<_>>())
}

// =============================================================================
// Enum Strategies
// =============================================================================

pub fn arb_status() -> impl Strategy<Value = CheckStatus> {
    prop_oneof![
        Just(CheckStatus::Ok),
        Just(CheckStatus::Warn),
        Just(CheckStatus::Fail),
    ]
}

pub fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

/// Engine spelling for a status, in a random casing.
fn arb_status_text(status: CheckStatus) -> impl Strategy<Value = String> {
    let text = match status {
        CheckStatus::Ok => "ok",
        CheckStatus::Warn => "warn",
        CheckStatus::Fail => "fail",
    };
    any::<bool>().prop_map(move |upper| {
        if upper {
            text.to_ascii_uppercase()
        } else {
            text.to_string()
        }
    })
}

/// Engine spelling for a severity; errors are spelled `FATAL`.
fn severity_text(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "INFO",
        Severity::Warning => "WARNING",
        Severity::Error => "FATAL",
    }
}

// =============================================================================
// Value Strategies
// =============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ,.'()#:-]{0,40}").expect("valid regex")
}

pub fn arb_finding() -> impl Strategy<Value = Finding> {
    (arb_severity(), arb_text(), arb_text())
        .prop_map(|(severity, description, details)| Finding::new(severity, description, details))
}

pub fn arb_check_result() -> impl Strategy<Value = CheckResult> {
    (
        arb_single_check(),
        arb_text(),
        arb_status(),
        prop::collection::vec(arb_finding(), 0..=MAX_FINDINGS),
    )
        .prop_map(|(check, description, status, findings)| {
            CheckResult::new(check, description, status, findings)
                .expect("single check is always accepted")
        })
}

pub fn arb_file_result() -> impl Strategy<Value = FileResult> {
    (
        "[a-z]{1,8}\\.czi",
        arb_status(),
        prop::collection::vec(arb_check_result(), 0..=MAX_CHECK_RESULTS),
    )
        .prop_map(|(file, status, results)| FileResult::new(file, status, results))
}

pub fn arb_configuration() -> impl Strategy<Value = Configuration> {
    (arb_checks(), -1i32..1000, any::<bool>(), any::<bool>()).prop_map(
        |(checks, max_findings, lax_parsing, ignore_size_m)| Configuration {
            checks,
            max_findings,
            lax_parsing,
            ignore_size_m,
        },
    )
}

// =============================================================================
// Report Strategies
// =============================================================================

/// A well-formed engine report whose entries use any alias of their check.
pub fn arb_report_dto() -> impl Strategy<Value = ReportDto> {
    let entry = (arb_check_result(), 0usize..3).prop_flat_map(|(result, alias)| {
        let info = result
            .check()
            .info()
            .expect("generated checks are known");
        let name = info.aliases()[alias].to_string();
        arb_status_text(result.status()).prop_map(move |status| TestEntryDto {
            check: name.clone(),
            description: result.description().to_string(),
            status: Some(status),
            findings: result
                .findings()
                .iter()
                .map(|f| FindingDto {
                    severity: Some(severity_text(f.severity).to_string()),
                    description: f.description.clone(),
                    details: f.details.clone(),
                })
                .collect(),
        })
    });

    (
        arb_status(),
        prop::option::of("[0-9]\\.[0-9]{1,2}\\.[0-9]{1,2}"),
        prop::collection::vec(entry, 0..=MAX_CHECK_RESULTS),
    )
        .prop_flat_map(|(overall, version, tests)| {
            arb_status_text(overall).prop_map(move |overall| ReportDto {
                overall_result: Some(overall),
                output_version: version.clone().map(|v| OutputVersionDto {
                    command: Some("CZICheck".to_string()),
                    version: Some(v),
                }),
                tests: tests.clone(),
            })
        })
}
