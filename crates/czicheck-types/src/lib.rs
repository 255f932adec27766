//! Data types (flag domain, configuration, report DTOs) for czicheck.
//!
//! This crate is intentionally "dumb": the frozen check vocabulary plus pure
//! DTOs with serde + schemars. Resolution and decoding logic lives in
//! `czicheck-domain`.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

// ── Flag Domain ────────────────────────────────────────────────

/// A set of CZI checks, encoded as the `CZICHECK_*` bit mask of the native API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Checks(u64);

impl Checks {
    pub const NONE: Checks = Checks(0);

    pub const HAS_VALID_SUBBLOCK_POSITIONS: Checks = Checks(0x0001);
    pub const HAS_VALID_SUBBLOCK_SEGMENTS: Checks = Checks(0x0002);
    pub const HAS_CONSISTENT_SUBBLOCK_DIMENSIONS: Checks = Checks(0x0004);
    pub const HAS_NO_DUPLICATE_SUBBLOCK_COORDINATES: Checks = Checks(0x0008);
    pub const DOES_NOT_USE_B_INDEX: Checks = Checks(0x0010);
    pub const HAS_ONLY_ONE_PIXEL_TYPE_PER_CHANNEL: Checks = Checks(0x0020);
    pub const HAS_PLANE_INDICES_STARTING_AT_ZERO: Checks = Checks(0x0040);
    pub const HAS_CONSECUTIVE_PLANE_INDICES: Checks = Checks(0x0080);
    pub const ALL_SUBBLOCKS_HAVE_M_INDEX: Checks = Checks(0x0100);
    pub const HAS_BASICALLY_VALID_METADATA: Checks = Checks(0x0200);
    /// Expensive; opt-in.
    pub const HAS_XML_SCHEMA_VALID_METADATA: Checks = Checks(0x0400);
    pub const HAS_NO_OVERLAPPING_SCENES_AT_SCALE1: Checks = Checks(0x0800);
    /// Expensive; opt-in.
    pub const HAS_VALID_SUBBLOCK_BITMAPS: Checks = Checks(0x1000);
    pub const HAS_CONSISTENT_M_INDEX: Checks = Checks(0x2000);
    pub const HAS_VALID_ATTACHMENT_DIRECTORY_POSITIONS: Checks = Checks(0x4000);
    pub const HAS_VALID_APPLIANCE_METADATA_TOPOGRAPHY: Checks = Checks(0x8000);

    /// The checks that are disabled by default (expensive operations).
    pub const OPT_IN: Checks =
        Self::HAS_XML_SCHEMA_VALID_METADATA.union(Self::HAS_VALID_SUBBLOCK_BITMAPS);

    /// All available checks.
    pub const ALL: Checks = Checks(0xFFFF);

    /// Every check that is not opt-in.
    pub const DEFAULT: Checks = Self::ALL.intersection(Self::OPT_IN.complement());

    pub const fn from_bits(bits: u64) -> Checks {
        Checks(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn union(self, other: Checks) -> Checks {
        Checks(self.0 | other.0)
    }

    pub const fn intersection(self, other: Checks) -> Checks {
        Checks(self.0 & other.0)
    }

    pub const fn complement(self) -> Checks {
        Checks(!self.0)
    }

    pub const fn contains(self, other: Checks) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Checks) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when exactly one bit is set.
    pub const fn is_single(self) -> bool {
        self.0.count_ones() == 1
    }

    /// Bits outside [`Checks::ALL`].
    pub const fn unknown_bits(self) -> Checks {
        Checks(self.0 & !Self::ALL.0)
    }

    /// The known single checks contained in this set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = &'static CheckInfo> {
        CHECKS.iter().filter(move |info| self.contains(info.check))
    }

    /// Vocabulary entry for a single known check.
    pub fn info(self) -> Option<&'static CheckInfo> {
        CHECKS.iter().find(|info| info.check == self)
    }
}

impl fmt::Display for Checks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let mut parts: Vec<String> = self.iter().map(|info| info.name.to_string()).collect();
        let unknown = self.unknown_bits();
        if !unknown.is_empty() {
            parts.push(format!("{:#x}", unknown.bits()));
        }
        f.write_str(&parts.join(", "))
    }
}

impl Serialize for Checks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Frozen Vocabulary ──────────────────────────────────────────

/// One row of the check alias table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInfo {
    pub check: Checks,
    /// Canonical descriptive name.
    pub name: &'static str,
    /// Short mnemonic used by the command line of the native tool.
    pub short_name: &'static str,
    /// Name of the checker class in the native engine (older naming convention).
    pub legacy_name: &'static str,
    pub description: &'static str,
}

impl CheckInfo {
    pub fn is_opt_in(&self) -> bool {
        Checks::OPT_IN.contains(self.check)
    }

    pub fn aliases(&self) -> [&'static str; 3] {
        [self.name, self.short_name, self.legacy_name]
    }
}

pub static CHECKS: [CheckInfo; 16] = [
    CheckInfo {
        check: Checks::HAS_VALID_SUBBLOCK_POSITIONS,
        name: "HasValidSubBlockPositions",
        short_name: "subblksegmentsinfile",
        legacy_name: "SubBlockDirectoryPositionsWithinRange",
        description: "SubBlock-Segment in SubBlockDirectory within file",
    },
    CheckInfo {
        check: Checks::HAS_VALID_SUBBLOCK_SEGMENTS,
        name: "HasValidSubBlockSegments",
        short_name: "subblksegmentsvalid",
        legacy_name: "SubBlockDirectorySegmentValid",
        description: "SubBlock-Segments in SubBlockDirectory are valid",
    },
    CheckInfo {
        check: Checks::HAS_CONSISTENT_SUBBLOCK_DIMENSIONS,
        name: "HasConsistentSubBlockDimensions",
        short_name: "subblkdimconsistent",
        legacy_name: "ConsistentSubBlockCoordinates",
        description: "Check subblock's coordinates for 'consistent dimensions'",
    },
    CheckInfo {
        check: Checks::HAS_NO_DUPLICATE_SUBBLOCK_COORDINATES,
        name: "HasNoDuplicateSubBlockCoordinates",
        short_name: "subblkcoordsunique",
        legacy_name: "DuplicateSubBlockCoordinates",
        description: "Check subblock's coordinates being unique",
    },
    CheckInfo {
        check: Checks::DOES_NOT_USE_B_INDEX,
        name: "DoesNotUseBIndex",
        short_name: "benabled",
        legacy_name: "BenabledDocument",
        description: "Check whether the document uses the deprecated 'B-index'",
    },
    CheckInfo {
        check: Checks::HAS_ONLY_ONE_PIXEL_TYPE_PER_CHANNEL,
        name: "HasOnlyOnePixelTypePerChannel",
        short_name: "samepixeltypeperchannel",
        legacy_name: "SamePixeltypePerChannel",
        description: "Check that the subblocks of a channel have the same pixeltype",
    },
    CheckInfo {
        check: Checks::HAS_PLANE_INDICES_STARTING_AT_ZERO,
        name: "HasPlaneIndicesStartingAtZero",
        short_name: "planesstartindex",
        legacy_name: "PlanesIndicesStartZero",
        description: "Check that planes indices start at 0",
    },
    CheckInfo {
        check: Checks::HAS_CONSECUTIVE_PLANE_INDICES,
        name: "HasConsecutivePlaneIndices",
        short_name: "consecutiveplaneindices",
        legacy_name: "PlaneIndicesAreConsecutive",
        description: "Check that planes have consecutive indices",
    },
    CheckInfo {
        check: Checks::ALL_SUBBLOCKS_HAVE_M_INDEX,
        name: "AllSubblocksHaveMIndex",
        short_name: "minallsubblks",
        legacy_name: "SubblocksHaveMindex",
        description: "Check if all subblocks have the M index",
    },
    CheckInfo {
        check: Checks::HAS_BASICALLY_VALID_METADATA,
        name: "HasBasicallyValidMetadata",
        short_name: "basicxmlmetadata",
        legacy_name: "BasicMetadataValidation",
        description: "Basic semantic checks of the XML-metadata",
    },
    CheckInfo {
        check: Checks::HAS_XML_SCHEMA_VALID_METADATA,
        name: "HasXmlSchemaValidMetadata",
        short_name: "xmlmetadataschema",
        legacy_name: "XmlMetadataSchemaValidation",
        description: "Validate the XML-metadata against XSD-schema",
    },
    CheckInfo {
        check: Checks::HAS_NO_OVERLAPPING_SCENES_AT_SCALE1,
        name: "HasNoOverlappingScenesAtScale1",
        short_name: "overlappingscenes",
        legacy_name: "CCheckOverlappingScenesOnLayer0",
        description: "Check if subblocks at pyramid-layer 0 of different scenes are overlapping",
    },
    CheckInfo {
        check: Checks::HAS_VALID_SUBBLOCK_BITMAPS,
        name: "HasValidSubBlockBitmaps",
        short_name: "subblkbitmapvalid",
        legacy_name: "CheckSubBlockBitmapValid",
        description: "SubBlock-Segments in SubBlockDirectory are valid and valid content",
    },
    CheckInfo {
        check: Checks::HAS_CONSISTENT_M_INDEX,
        name: "HasConsistentMIndex",
        short_name: "mindexconsistent",
        legacy_name: "ConsistentMIndex",
        description: "Check for consistent M-Index usage",
    },
    CheckInfo {
        check: Checks::HAS_VALID_ATTACHMENT_DIRECTORY_POSITIONS,
        name: "HasValidAttachmentDirectoryPositions",
        short_name: "attachmentsegmentsinfile",
        legacy_name: "AttachmentDirectoryPositionsWithinRange",
        description: "Attachment-Segments in AttachmentDirectory within file",
    },
    CheckInfo {
        check: Checks::HAS_VALID_APPLIANCE_METADATA_TOPOGRAPHY,
        name: "HasValidApplianceMetadataTopography",
        short_name: "topographymetadata",
        legacy_name: "ApplianceMetadataTopographyItemValid",
        description: "Basic semantic checks for TopographyDataItems",
    },
];

/// Aggregate keywords. `none` is listed so it can be recognised, but it never
/// selects anything on its own.
pub static AGGREGATES: [(&str, Checks); 4] = [
    ("none", Checks::NONE),
    ("default", Checks::DEFAULT),
    ("all", Checks::ALL),
    ("optin", Checks::OPT_IN),
];

// ── Status and Severity ────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        }
    }
}

/// Severity of a finding, ordered by ascending seriousness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One issue reported by a check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub severity: Severity,
    pub description: String,
    pub details: String,
}

impl Finding {
    pub fn new(
        severity: Severity,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            description: description.into(),
            details: details.into(),
        }
    }
}

// ── Configuration ──────────────────────────────────────────────

/// Options handed to the native validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub struct Configuration {
    /// Which checks to run.
    #[schemars(with = "String")]
    pub checks: Checks,
    /// How many findings are reported per check. Negative means "no limit".
    pub max_findings: i32,
    /// Allows operation on some malformed CZIs which would otherwise not be
    /// analyzable at all.
    pub lax_parsing: bool,
    /// Ignore the 'SizeM' field for pyramid subblocks.
    pub ignore_size_m: bool,
}

impl Configuration {
    pub const DEFAULT: Configuration = Configuration {
        checks: Checks::DEFAULT,
        max_findings: -1,
        lax_parsing: false,
        ignore_size_m: false,
    };

    pub fn with_checks(self, checks: Checks) -> Self {
        Self { checks, ..self }
    }

    pub fn with_max_findings(self, max_findings: i32) -> Self {
        Self {
            max_findings,
            ..self
        }
    }

    pub fn with_lax_parsing(self, lax_parsing: bool) -> Self {
        Self {
            lax_parsing,
            ..self
        }
    }

    pub fn with_ignore_size_m(self, ignore_size_m: bool) -> Self {
        Self {
            ignore_size_m,
            ..self
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The on-disk configuration file (`czicheck.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Defaults {
    /// Comma-separated check list, e.g. `"default,xmlmetadataschema"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lax_parsing: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_size_m: Option<bool>,
}

// ── Engine report DTOs ─────────────────────────────────────────

/// The JSON document written by the native engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_version: Option<OutputVersionDto>,

    #[serde(default)]
    pub tests: Vec<TestEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutputVersionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One per-check entry of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TestEntryDto {
    /// Any alias of the check (the engine emits its checker name).
    #[serde(alias = "name")]
    pub check: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "result", alias = "severity")]
    pub status: Option<String>,

    #[serde(default)]
    pub findings: Vec<FindingDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindingDto {
    #[serde(default)]
    pub severity: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_are_fixed() {
        assert_eq!(Checks::ALL.bits(), 0xFFFF);
        assert_eq!(Checks::OPT_IN.bits(), 0x1400);
        assert_eq!(Checks::DEFAULT.bits(), 0xEBFF);
        assert!(!Checks::DEFAULT.intersects(Checks::OPT_IN));
        assert_eq!(Checks::DEFAULT.union(Checks::OPT_IN), Checks::ALL);
    }

    #[test]
    fn topography_runs_by_default() {
        let topography = Checks::HAS_VALID_APPLIANCE_METADATA_TOPOGRAPHY;
        assert!(Checks::DEFAULT.contains(topography));
        assert!(!Checks::OPT_IN.intersects(topography));
    }

    #[test]
    fn vocabulary_covers_every_bit_once() {
        let mut seen = Checks::NONE;
        for info in CHECKS.iter() {
            assert!(info.check.is_single(), "{} must be a single bit", info.name);
            assert!(!seen.intersects(info.check), "{} is duplicated", info.name);
            seen = seen.union(info.check);
        }
        assert_eq!(seen, Checks::ALL);
    }

    #[test]
    fn opt_in_rows_are_flagged() {
        let opt_in: Vec<&str> = CHECKS
            .iter()
            .filter(|info| info.is_opt_in())
            .map(|info| info.name)
            .collect();
        assert_eq!(
            opt_in,
            vec!["HasXmlSchemaValidMetadata", "HasValidSubBlockBitmaps"]
        );
    }

    #[test]
    fn display_names_bits_in_order() {
        assert_eq!(Checks::NONE.to_string(), "None");
        assert_eq!(
            Checks::HAS_VALID_SUBBLOCK_SEGMENTS
                .union(Checks::HAS_VALID_SUBBLOCK_POSITIONS)
                .to_string(),
            "HasValidSubBlockPositions, HasValidSubBlockSegments"
        );
        assert_eq!(
            Checks::from_bits(0x1_0001).to_string(),
            "HasValidSubBlockPositions, 0x10000"
        );
    }

    #[test]
    fn status_and_severity_as_str() {
        assert_eq!(CheckStatus::Ok.as_str(), "ok");
        assert_eq!(CheckStatus::Warn.as_str(), "warn");
        assert_eq!(CheckStatus::Fail.as_str(), "fail");

        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::Error.as_str(), "error");
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn configuration_defaults_match_expected_values() {
        let cfg = Configuration::default();
        assert_eq!(cfg, Configuration::DEFAULT);
        assert_eq!(cfg.checks, Checks::DEFAULT);
        assert_eq!(cfg.max_findings, -1);
        assert!(!cfg.lax_parsing);
        assert!(!cfg.ignore_size_m);

        let custom = cfg
            .with_checks(Checks::OPT_IN)
            .with_max_findings(50)
            .with_lax_parsing(true)
            .with_ignore_size_m(true);
        assert_eq!(custom.checks, Checks::OPT_IN);
        assert_eq!(custom.max_findings, 50);
        assert!(custom.lax_parsing);
        assert!(custom.ignore_size_m);
    }

    #[test]
    fn configuration_serializes_checks_by_name() {
        let cfg = Configuration::DEFAULT.with_checks(Checks::DOES_NOT_USE_B_INDEX);
        let value = serde_json::to_value(cfg).expect("serialize configuration");
        assert_eq!(
            value.get("checks").and_then(|v| v.as_str()),
            Some("DoesNotUseBIndex")
        );
    }

    #[test]
    fn report_dto_accepts_engine_field_names() {
        let json = r#"{
            "outputVersion": { "command": "CZICheck", "version": "0.6.5" },
            "overallResult": "WARN",
            "tests": [
                { "name": "BenabledDocument", "description": "d", "result": "WARN",
                  "findings": [ { "severity": "WARNING", "description": "x", "details": "" } ] },
                { "check": "benabled", "description": "d", "status": "OK" }
            ]
        }"#;
        let dto: ReportDto = serde_json::from_str(json).expect("parse report");
        assert_eq!(dto.overall_result.as_deref(), Some("WARN"));
        assert_eq!(
            dto.output_version.and_then(|v| v.version).as_deref(),
            Some("0.6.5")
        );
        assert_eq!(dto.tests.len(), 2);
        assert_eq!(dto.tests[0].check, "BenabledDocument");
        assert_eq!(dto.tests[0].status.as_deref(), Some("WARN"));
        assert_eq!(dto.tests[0].findings.len(), 1);
        assert_eq!(dto.tests[1].status.as_deref(), Some("OK"));
        assert!(dto.tests[1].findings.is_empty());
    }

    #[test]
    fn config_file_parses_from_toml() {
        let cfg: ConfigFile = toml::from_str(
            r#"
[defaults]
checks = "default,xmlmetadataschema"
max_findings = 10
"#,
        )
        .expect("parse config");
        assert_eq!(
            cfg.defaults.checks.as_deref(),
            Some("default,xmlmetadataschema")
        );
        assert_eq!(cfg.defaults.max_findings, Some(10));
        assert_eq!(cfg.defaults.lax_parsing, None);
    }
}
