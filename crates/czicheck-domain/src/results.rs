//! Immutable result values: one `CheckResult` per executed check, aggregated
//! into a `FileResult` per validated file.
//!
//! Equality and hashing are deep and order-sensitive: reordering findings or
//! check results yields a different value.

use serde::Serialize;

use czicheck_types::{CheckStatus, Checks, Finding, Severity};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckResultError {
    #[error("check must be None or a single check, but {check} is more than one check.")]
    MultipleChecks { check: Checks },

    #[error("check {check} is not a known check.")]
    UnknownCheck { check: Checks },
}

/// Outcome of running one check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CheckResult {
    check: Checks,
    description: String,
    status: CheckStatus,
    findings: Vec<Finding>,
}

impl CheckResult {
    /// `check` must be [`Checks::NONE`] (findings not attributable to a
    /// specific check) or exactly one known check.
    pub fn new(
        check: Checks,
        description: impl Into<String>,
        status: CheckStatus,
        findings: Vec<Finding>,
    ) -> Result<Self, CheckResultError> {
        if !check.is_empty() && !check.is_single() {
            return Err(CheckResultError::MultipleChecks { check });
        }
        if !check.unknown_bits().is_empty() {
            return Err(CheckResultError::UnknownCheck { check });
        }

        Ok(Self {
            check,
            description: description.into(),
            status,
            findings,
        })
    }

    pub fn check(&self) -> Checks {
        self.check
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Most serious severity among the findings, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}

/// Aggregate outcome across all executed checks for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileResult {
    file: String,
    file_status: CheckStatus,
    check_results: Vec<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    /// Engine error output or decode failure text.
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

impl FileResult {
    pub fn new(
        file: impl Into<String>,
        file_status: CheckStatus,
        check_results: Vec<CheckResult>,
    ) -> Self {
        Self {
            file: file.into(),
            file_status,
            check_results,
            version: None,
            diagnostic: None,
        }
    }

    /// A result for a validation attempt that produced no usable report.
    pub fn failed(file: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::new(file, CheckStatus::Fail, Vec::new()).with_diagnostic(diagnostic)
    }

    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..self
        }
    }

    pub fn with_diagnostic(self, diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: Some(diagnostic.into()),
            ..self
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn file_status(&self) -> CheckStatus {
        self.file_status
    }

    pub fn check_results(&self) -> &[CheckResult] {
        &self.check_results
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Check results with the given status, in their original order.
    pub fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckResult> + '_ {
        self.check_results
            .iter()
            .filter(move |r| r.status == status)
    }

    /// All findings across all check results, in order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.check_results.iter().flat_map(|r| r.findings.iter())
    }

    pub fn result_for(&self, check: Checks) -> Option<&CheckResult> {
        self.check_results.iter().find(|r| r.check == check)
    }
}
