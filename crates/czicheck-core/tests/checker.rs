//! Facade behaviour: dispose, async checks, version queries.

use std::sync::Arc;

use czicheck_core::{CancellationToken, CheckerError, CziChecker, UNKNOWN_VERSION};
use czicheck_testkit::{FakeEngine, fixtures};
use czicheck_types::{Checks, Configuration};

fn sample_engine() -> Arc<FakeEngine> {
    Arc::new(FakeEngine::succeeding(fixtures::SAMPLE_REPORT_JSON))
}

#[test]
fn check_after_dispose_fails_without_engine_calls() {
    let engine = sample_engine();
    let checker = CziChecker::new(Configuration::DEFAULT, engine.clone());
    checker.dispose();
    checker.dispose();
    checker.dispose();

    assert!(checker.is_disposed());
    assert!(matches!(checker.check("somefile.czi"), Err(CheckerError::Disposed)));
    assert!(engine.calls().is_empty());
}

#[test]
fn configuration_is_passed_to_engine() {
    let engine = sample_engine();
    let config = Configuration::DEFAULT
        .with_checks(Checks::ALL)
        .with_max_findings(100);
    let checker = CziChecker::new(config, engine.clone());
    assert_eq!(checker.configuration(), &config);

    checker.check(fixtures::SAMPLE_FILE).unwrap();
    assert_eq!(
        engine.calls()[0],
        czicheck_testkit::EngineCall::Create { config }
    );
}

#[test]
fn repeated_checks_use_fresh_handles() {
    let engine = sample_engine();
    let checker = CziChecker::new(Configuration::DEFAULT, engine.clone());
    for _ in 0..3 {
        checker.check(fixtures::SAMPLE_FILE).unwrap();
    }
    assert_eq!(engine.creates(), 3);
    assert_eq!(engine.destroys(), 3);
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn version_prefers_string() {
    let engine = Arc::new(
        FakeEngine::succeeding("{}")
            .with_version_string("0.6.5")
            .with_version(1, 2, 3),
    );
    let checker = CziChecker::new(Configuration::DEFAULT, engine);
    assert_eq!(checker.engine_version().unwrap(), "0.6.5");
}

#[test]
fn version_falls_back_to_numeric_then_unknown() {
    let engine = Arc::new(FakeEngine::succeeding("{}").with_version(0, 6, 5));
    let checker = CziChecker::new(Configuration::DEFAULT, engine);
    assert_eq!(checker.engine_version().unwrap(), "0.6.5");

    let engine = Arc::new(FakeEngine::succeeding("{}"));
    let checker = CziChecker::new(Configuration::DEFAULT, engine);
    assert_eq!(checker.engine_version().unwrap(), UNKNOWN_VERSION);
}

#[tokio::test]
async fn check_async_matches_check() {
    let engine = sample_engine();
    let checker = CziChecker::new(Configuration::DEFAULT, engine.clone());
    let result = checker
        .check_async(fixtures::SAMPLE_FILE, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result, fixtures::sample_file_result());
    assert_eq!(engine.destroys(), 1);
}

#[tokio::test]
async fn cancelled_token_prevents_the_call() {
    let engine = sample_engine();
    let checker = CziChecker::new(Configuration::DEFAULT, engine.clone());
    let token = CancellationToken::new();
    token.cancel();

    let err = checker
        .check_async(fixtures::SAMPLE_FILE, token)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::Cancelled));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn check_async_after_dispose_fails() {
    let engine = sample_engine();
    let checker = CziChecker::new(Configuration::DEFAULT, engine.clone());
    checker.dispose();
    let err = checker
        .check_async("a.czi", CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::Disposed));
}

#[tokio::test]
async fn check_async_reports_usage_errors() {
    let checker = CziChecker::new(Configuration::DEFAULT, sample_engine());
    let err = checker
        .check_async("   ", CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::EmptyPath));
}
