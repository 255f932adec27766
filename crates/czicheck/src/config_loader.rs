//! Configuration loading and precedence.
//!
//! Sources, highest priority first:
//! - command-line flags
//! - `czicheck.toml` (explicit `--config`, else `./czicheck.toml` if present)
//! - built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use czicheck_domain::resolve_checks;
use czicheck_types::{ConfigFile, Configuration};

pub const DEFAULT_CONFIG_FILE: &str = "czicheck.toml";

/// Settings given on the command line; `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub checks: Option<String>,
    pub max_findings: Option<i32>,
    pub lax_parsing: bool,
    pub ignore_size_m: bool,
}

/// The explicit path, or `./czicheck.toml` when it exists.
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let p = PathBuf::from(DEFAULT_CONFIG_FILE);
        p.exists().then_some(p)
    })
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    debug!("Loading config from '{}'", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse config '{}'", path.display()))
}

/// Load the config file if one applies; an absent file yields the empty config.
pub fn load_config(explicit: Option<PathBuf>) -> Result<ConfigFile> {
    match config_path(explicit) {
        Some(path) => load_config_file(&path),
        None => {
            debug!("No config file; using built-in defaults");
            Ok(ConfigFile::default())
        }
    }
}

/// Merge file defaults and command-line overrides into a validator configuration.
pub fn resolve_configuration(file: &ConfigFile, overrides: &Overrides) -> Result<Configuration> {
    let defaults = &file.defaults;
    let mut config = Configuration::DEFAULT;

    let checks_text = overrides.checks.as_deref().or(defaults.checks.as_deref());
    if let Some(text) = checks_text {
        let checks =
            resolve_checks(text).with_context(|| format!("invalid check list '{text}'"))?;
        config = config.with_checks(checks);
    }

    if let Some(n) = overrides.max_findings.or(defaults.max_findings) {
        config = config.with_max_findings(n);
    }

    config = config
        .with_lax_parsing(overrides.lax_parsing || defaults.lax_parsing.unwrap_or(false))
        .with_ignore_size_m(overrides.ignore_size_m || defaults.ignore_size_m.unwrap_or(false));

    debug!(checks = %config.checks, max_findings = config.max_findings, "resolved configuration");
    Ok(config)
}
