use std::ffi::CString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use czicheck_domain::FileResult;
use czicheck_types::{Checks, Configuration};

use crate::engine::ValidationEngine;
use crate::protocol::{query_version_string, run_validation};

pub const UNKNOWN_VERSION: &str = "Unknown version";

#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("CZI file path must be specified.")]
    EmptyPath,

    #[error("CZI file path must not contain NUL bytes: {path:?}")]
    InvalidPath { path: String },

    #[error("configuration selects unknown checks: {checks}")]
    InvalidConfiguration { checks: Checks },

    #[error("checker has been disposed")]
    Disposed,

    #[error("Invalid validator pointer.")]
    InvalidHandle,

    #[error("Failed to create validator. Invalid configuration parameters.")]
    CreateValidator,

    #[error("engine requested a {size}-byte buffer, which cannot be allocated")]
    BufferTooLarge { size: u64 },

    #[error("check was cancelled before it started")]
    Cancelled,

    #[error("validation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Validates CZI files with one fixed configuration.
///
/// Each call creates a fresh native validator and destroys it before
/// returning, so a checker holds no engine state between calls.
pub struct CziChecker {
    inner: Arc<Inner>,
}

struct Inner {
    config: Configuration,
    engine: Arc<dyn ValidationEngine>,
    disposed: AtomicBool,
}

impl CziChecker {
    pub fn new(config: Configuration, engine: Arc<dyn ValidationEngine>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                engine,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.inner.config
    }

    /// Validate one file.
    ///
    /// Usage errors (blank path, NUL in path, unknown check bits, disposed
    /// checker) are returned before the engine is touched. Engine-reported
    /// failures other than an invalid handle come back as a failed
    /// [`FileResult`] carrying a diagnostic.
    pub fn check(&self, path: &str) -> Result<FileResult, CheckerError> {
        self.inner.check(path)
    }

    /// [`check`](Self::check) on a blocking task. The call does not start if
    /// `cancel` is already cancelled; once started it runs to completion.
    pub async fn check_async(
        &self,
        path: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<FileResult, CheckerError> {
        self.inner.ensure_live()?;
        if cancel.is_cancelled() {
            return Err(CheckerError::Cancelled);
        }

        let inner = Arc::clone(&self.inner);
        let path = path.into();
        tokio::task::spawn_blocking(move || {
            if cancel.is_cancelled() {
                return Err(CheckerError::Cancelled);
            }
            inner.check(&path)
        })
        .await?
    }

    /// Version reported by the engine: the version string if it offers one,
    /// else `major.minor.patch`, else [`UNKNOWN_VERSION`].
    pub fn engine_version(&self) -> Result<String, CheckerError> {
        self.inner.ensure_live()?;
        let engine = self.inner.engine.as_ref();
        if let Some(text) = query_version_string(engine) {
            return Ok(text);
        }
        Ok(match engine.version() {
            Some((major, minor, patch)) => format!("{major}.{minor}.{patch}"),
            None => UNKNOWN_VERSION.to_string(),
        })
    }

    /// Mark the checker unusable. Idempotent.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::SeqCst) {
            debug!("checker disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl Inner {
    fn ensure_live(&self) -> Result<(), CheckerError> {
        if self.disposed.load(Ordering::SeqCst) {
            Err(CheckerError::Disposed)
        } else {
            Ok(())
        }
    }

    fn check(&self, path: &str) -> Result<FileResult, CheckerError> {
        self.ensure_live()?;
        if path.trim().is_empty() {
            return Err(CheckerError::EmptyPath);
        }
        let unknown = self.config.checks.unknown_bits();
        if !unknown.is_empty() {
            return Err(CheckerError::InvalidConfiguration { checks: unknown });
        }
        let c_path = CString::new(path).map_err(|_| CheckerError::InvalidPath {
            path: path.to_string(),
        })?;

        info!(file = path, checks = %self.config.checks, "validating");
        let result = run_validation(self.engine.as_ref(), &self.config, &c_path, path)?;
        debug!(file = path, status = result.file_status().as_str(), "validated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::engine::RawHandle;

    /// Engine that must never be reached.
    #[derive(Default)]
    struct Untouchable {
        calls: AtomicUsize,
    }

    impl ValidationEngine for Untouchable {
        fn create_validator(&self, _: &Configuration) -> Option<RawHandle> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            None
        }

        fn validate_file(
            &self,
            _: RawHandle,
            _: &CStr,
            _: Option<&mut [u8]>,
            _: &mut u64,
            _: Option<&mut [u8]>,
            _: &mut usize,
        ) -> i32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            0
        }

        fn destroy_validator(&self, _: RawHandle) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn version(&self) -> Option<(i32, i32, i32)> {
            None
        }

        fn version_string(&self, _: Option<&mut [u8]>, _: &mut u64) -> bool {
            false
        }
    }

    fn checker(config: Configuration) -> (CziChecker, Arc<Untouchable>) {
        let engine = Arc::new(Untouchable::default());
        (CziChecker::new(config, engine.clone()), engine)
    }

    #[test]
    fn blank_paths_are_rejected_before_engine() {
        let (checker, engine) = checker(Configuration::DEFAULT);
        for path in ["", "   ", "\t\n"] {
            assert!(matches!(checker.check(path), Err(CheckerError::EmptyPath)));
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nul_in_path_is_rejected() {
        let (checker, engine) = checker(Configuration::DEFAULT);
        assert!(matches!(
            checker.check("a\0b.czi"),
            Err(CheckerError::InvalidPath { .. })
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_bits_are_rejected() {
        let config = Configuration::DEFAULT.with_checks(Checks::from_bits(0x1_0001));
        let (checker, engine) = checker(config);
        let err = checker.check("file.czi").unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration selects unknown checks: 0x10000"
        );
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_handle_is_create_error() {
        let (checker, engine) = checker(Configuration::DEFAULT);
        assert!(matches!(
            checker.check("file.czi"),
            Err(CheckerError::CreateValidator)
        ));
        // create was attempted, nothing else
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let (checker, engine) = checker(Configuration::DEFAULT);
        assert!(!checker.is_disposed());
        checker.dispose();
        checker.dispose();
        assert!(checker.is_disposed());
        assert!(matches!(checker.check("file.czi"), Err(CheckerError::Disposed)));
        assert!(matches!(checker.engine_version(), Err(CheckerError::Disposed)));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn version_falls_back_to_unknown() {
        let (checker, _) = checker(Configuration::DEFAULT);
        assert_eq!(checker.engine_version().unwrap(), UNKNOWN_VERSION);
    }

    #[test]
    fn configuration_is_kept() {
        let config = Configuration::DEFAULT.with_max_findings(3);
        let (checker, _) = checker(config);
        assert_eq!(checker.configuration(), &config);
    }
}
