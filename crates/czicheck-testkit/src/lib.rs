//! Shared test utilities for the czicheck workspace.
//!
//! This crate provides:
//! - **arb**: Proptest strategies for check masks, result values and engine reports
//! - **engine**: `FakeEngine`, a scripted in-process validation engine
//! - **fixtures**: The sample engine report and the result it decodes to
//! - **schema**: JSON schema validation for the report and config DTOs
//! - **samples**: Download and MD5 verification of sample CZI files
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use czicheck_core::CziChecker;
//! use czicheck_testkit::{FakeEngine, fixtures};
//!
//! let engine = Arc::new(FakeEngine::succeeding(fixtures::SAMPLE_REPORT_JSON));
//! let checker = CziChecker::new(Default::default(), engine.clone());
//! let result = checker.check(fixtures::SAMPLE_FILE).unwrap();
//! assert_eq!(result, fixtures::sample_file_result());
//! assert_eq!(engine.destroys(), 1);
//! ```

pub mod arb;
pub mod engine;
pub mod fixtures;
pub mod samples;
pub mod schema;

pub use arb::{
    arb_check_result, arb_checks, arb_configuration, arb_file_result, arb_finding,
    arb_report_dto, arb_severity, arb_single_check, arb_status,
};
pub use engine::{EngineCall, FakeEngine};
pub use fixtures::{SAMPLE_FILE, SAMPLE_REPORT_JSON, sample_file_result};
pub use samples::{
    Fetch, SAMPLE_MIRRORS, SampleCase, SampleError, UreqFetch, ensure_sample, md5_hex, sample_cases,
};
pub use schema::{SchemaValidationError, validate_config_json, validate_report_json};
