use std::collections::HashMap;
use std::sync::OnceLock;

use czicheck_types::{Checks, AGGREGATES, CHECKS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecksParseError {
    #[error("no checks given")]
    Empty,

    #[error("unknown check '{token}'")]
    UnknownToken { token: String },
}

/// Lower-cased alias → flag value, covering every spelling of every check
/// plus the aggregate keywords.
fn alias_table() -> &'static HashMap<String, Checks> {
    static TABLE: OnceLock<HashMap<String, Checks>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for info in CHECKS.iter() {
            for alias in info.aliases() {
                table.insert(alias.to_ascii_lowercase(), info.check);
            }
        }
        for (keyword, mask) in AGGREGATES.iter() {
            table.insert((*keyword).to_string(), *mask);
        }
        table
    })
}

/// Whole-token, case-insensitive lookup. The zero mask never counts as a match.
fn lookup(token: &str) -> Option<Checks> {
    alias_table()
        .get(&token.to_ascii_lowercase())
        .copied()
        .filter(|mask| !mask.is_empty())
}

/// Resolve a comma-separated check list, reporting the first offending token.
pub fn resolve_checks(text: &str) -> Result<Checks, ChecksParseError> {
    if text.trim().is_empty() {
        return Err(ChecksParseError::Empty);
    }

    let mut mask = Checks::NONE;
    let mut matched = false;
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(found) = lookup(token) else {
            return Err(ChecksParseError::UnknownToken {
                token: token.to_string(),
            });
        };
        mask = mask.union(found);
        matched = true;
    }

    if matched {
        Ok(mask)
    } else {
        Err(ChecksParseError::Empty)
    }
}

/// Resolve free-form text into a check mask. All-or-nothing: any unknown
/// token rejects the whole list.
pub fn parse_checks(text: Option<&str>) -> Option<Checks> {
    resolve_checks(text?).ok()
}

/// `(mask, ok)` form of [`parse_checks`]; the mask is empty whenever `ok` is false.
pub fn try_parse_checks(text: Option<&str>) -> (Checks, bool) {
    match parse_checks(text) {
        Some(mask) => (mask, true),
        None => (Checks::NONE, false),
    }
}

/// Reverse lookup of a single check by any of its aliases.
pub fn check_from_name(name: &str) -> Option<Checks> {
    lookup(name.trim()).filter(|mask| mask.is_single())
}
