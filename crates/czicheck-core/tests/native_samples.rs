//! The linked libczicheckc against real files.
//!
//! Sample cases come from `CZICHECK_SAMPLES_DIR` (default `tests/samples`):
//! `<name>.czi.md5` plus `<name>.txt.json`, with the CZI fetched by MD5 when
//! it is not on disk yet.

#![cfg(feature = "native")]

use std::path::PathBuf;
use std::sync::Arc;

use czicheck_core::{CziChecker, NativeEngine, UNKNOWN_VERSION};
use czicheck_domain::decode_report;
use czicheck_testkit::{UreqFetch, ensure_sample, md5_hex, sample_cases};
use czicheck_types::{CheckStatus, Checks, Configuration};

fn samples_dir() -> PathBuf {
    std::env::var_os("CZICHECK_SAMPLES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/samples"))
}

fn native_checker(config: Configuration) -> CziChecker {
    CziChecker::new(config, Arc::new(NativeEngine))
}

#[test]
fn engine_reports_a_version() {
    let checker = native_checker(Configuration::DEFAULT);
    let version = checker.engine_version().expect("engine version");
    assert!(!version.is_empty());
    assert_ne!(version, UNKNOWN_VERSION);
}

#[test]
fn missing_file_is_a_failed_result() {
    let dir = tempfile::tempdir().expect("temp");
    let path = dir.path().join("does-not-exist.czi");
    let path = path.to_string_lossy();

    let checker = native_checker(Configuration::DEFAULT);
    let result = checker.check(&path).expect("engine failure is data");
    assert_eq!(result.file(), path);
    assert_eq!(result.file_status(), CheckStatus::Fail);
    assert!(result.diagnostic().is_some(), "{result:?}");
}

#[test]
fn repeated_checks_on_one_checker() {
    let dir = tempfile::tempdir().expect("temp");
    let path = dir.path().join("absent.czi");
    let path = path.to_string_lossy();

    let checker = native_checker(Configuration::DEFAULT.with_checks(Checks::ALL));
    let first = checker.check(&path).expect("first check");
    let second = checker.check(&path).expect("second check");
    assert_eq!(first, second);
}

#[test]
fn samples_match_expected_reports() {
    let dir = samples_dir();
    let cases = sample_cases(&dir).expect("read sample dir");
    if cases.is_empty() {
        eprintln!("no sample cases in {}; skipping", dir.display());
        return;
    }

    let config = Configuration::DEFAULT
        .with_checks(Checks::ALL)
        .with_lax_parsing(true);
    let checker = native_checker(config);

    for case in cases {
        ensure_sample(&case.czi, &case.md5, &UreqFetch).expect("sample available");
        let bytes = std::fs::read(&case.czi).expect("read sample");
        assert_eq!(md5_hex(&bytes), case.md5.to_ascii_lowercase());

        let file = case.czi.to_string_lossy();
        let actual = checker.check(&file).expect("check sample");
        let expected = decode_report(&case.expected_json, &file).expect("expected report");

        assert_eq!(
            actual,
            expected,
            "{}\n==ACTUAL==\n{}\n==EXPECTED==\n{}",
            case.czi.display(),
            serde_json::to_string_pretty(&actual).unwrap_or_default(),
            serde_json::to_string_pretty(&expected).unwrap_or_default(),
        );
        assert!(
            actual
                .check_results()
                .iter()
                .all(|r| r.check() != Checks::NONE)
        );
    }
}
