//! JSON schema validation for the report and configuration DTOs.
//!
//! Schemas are generated from the types with `schemars` at runtime, so they
//! always match the code; `cargo xtask schema` writes the same documents to
//! `schemas/`.

use czicheck_types::{ConfigFile, ReportDto};
use jsonschema::JSONSchema;
use schemars::schema_for;

#[derive(Debug, thiserror::Error)]
#[error("schema validation failed: {}", .errors.join("; "))]
pub struct SchemaValidationError {
    pub errors: Vec<String>,
}

fn compile(schema: schemars::schema::RootSchema) -> JSONSchema {
    let value = serde_json::to_value(schema).expect("schema serializes to JSON");
    JSONSchema::compile(&value).expect("generated schema compiles")
}

pub fn report_schema() -> JSONSchema {
    compile(schema_for!(ReportDto))
}

pub fn config_schema() -> JSONSchema {
    compile(schema_for!(ConfigFile))
}

/// Validate an engine report document.
pub fn validate_report_json(json: &serde_json::Value) -> Result<(), SchemaValidationError> {
    validate(&report_schema(), json)
}

/// Validate a configuration document (the TOML file, as JSON).
pub fn validate_config_json(json: &serde_json::Value) -> Result<(), SchemaValidationError> {
    validate(&config_schema(), json)
}

fn validate(schema: &JSONSchema, json: &serde_json::Value) -> Result<(), SchemaValidationError> {
    schema.validate(json).map_err(|errors| SchemaValidationError {
        errors: errors.map(|e| e.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{SAMPLE_CONFIG_TOML, SAMPLE_REPORT_JSON};

    #[test]
    fn sample_report_matches_schema() {
        // Canonical field names, as written back by the DTO.
        let report = czicheck_domain::parse_report(SAMPLE_REPORT_JSON).unwrap();
        let json = serde_json::to_value(report).unwrap();
        validate_report_json(&json).unwrap();
    }

    #[test]
    fn report_with_wrong_types_is_rejected() {
        let json = serde_json::json!({ "tests": "not a list" });
        let err = validate_report_json(&json).unwrap_err();
        assert!(!err.errors.is_empty());
        assert!(err.to_string().starts_with("schema validation failed: "));
    }

    #[test]
    fn sample_config_matches_schema() {
        let config: ConfigFile = toml::from_str(SAMPLE_CONFIG_TOML).unwrap();
        let json = serde_json::to_value(config).unwrap();
        validate_config_json(&json).unwrap();
    }

    #[test]
    fn config_with_wrong_types_is_rejected() {
        let json = serde_json::json!({ "defaults": { "max_findings": "many" } });
        assert!(validate_config_json(&json).is_err());
    }
}
