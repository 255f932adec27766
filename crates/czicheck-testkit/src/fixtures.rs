//! Common test fixtures: a recorded engine report and the result it must
//! decode to.

use czicheck_domain::{CheckResult, FileResult};
use czicheck_types::{CheckStatus, Checks, Finding, Severity};

pub const SAMPLE_FILE: &str = "edf-superfluous-missing-channel-subblock.czi";

/// Report produced with all checks enabled and lax parsing, 13 entries.
pub const SAMPLE_REPORT_JSON: &str = r#"{
  "outputVersion": { "command": "CZICheck", "version": "0.6.5" },
  "tests": [
    { "name": "SubBlockDirectoryPositionsWithinRange",
      "description": "SubBlock-Segment in SubBlockDirectory within file",
      "result": "OK", "findings": [] },
    { "name": "SubBlockDirectorySegmentValid",
      "description": "SubBlock-Segments in SubBlockDirectory are valid",
      "result": "OK", "findings": [] },
    { "name": "ConsistentSubBlockCoordinates",
      "description": "Check subblock's coordinates for 'consistent dimensions'",
      "result": "OK", "findings": [] },
    { "name": "DuplicateSubBlockCoordinates",
      "description": "Check subblock's coordinates being unique",
      "result": "OK", "findings": [] },
    { "name": "BenabledDocument",
      "description": "Check whether the document uses the deprecated 'B-index'",
      "result": "OK", "findings": [] },
    { "name": "SamePixeltypePerChannel",
      "description": "Check that the subblocks of a channel have the same pixeltype",
      "result": "OK", "findings": [] },
    { "name": "PlanesIndicesStartZero",
      "description": "Check that planes indices start at 0",
      "result": "OK", "findings": [] },
    { "name": "PlaneIndicesAreConsecutive",
      "description": "Check that planes have consecutive indices",
      "result": "OK", "findings": [] },
    { "name": "SubblocksHaveMindex",
      "description": "Check if all subblocks have the M index",
      "result": "OK", "findings": [] },
    { "name": "BasicMetadataValidation",
      "description": "Basic semantic checks of the XML-metadata",
      "result": "WARN",
      "findings": [
        { "severity": "WARNING",
          "description": "document statistics gives 1 channels, whereas in XML-metadata 2 channels are found.",
          "details": "" },
        { "severity": "INFO",
          "description": "No sub block-information found for channel index 1, metadata pixelType: gray32float",
          "details": "" },
        { "severity": "WARNING",
          "description": "No valid ComponentBitCount information found in metadata for channel #1.",
          "details": "" }
      ] },
    { "name": "XmlMetadataSchemaValidation",
      "description": "Validate the XML-metadata against XSD-schema",
      "result": "FAIL",
      "findings": [
        { "severity": "FATAL",
          "description": "(120,22): no declaration found for element 'RotationCenter'",
          "details": "" },
        { "severity": "FATAL",
          "description": "(126,15): element 'RotationCenter' is not allowed for content model 'All(SessionMatrix?,HolderZeissName?,HolderZeissId?,HolderCwsId?,SessionCount?,SessionRotationAtStart?,CustomAttributes?)'",
          "details": "" }
      ] },
    { "name": "CCheckOverlappingScenesOnLayer0",
      "description": "Check if subblocks at pyramid-layer 0 of different scenes are overlapping",
      "result": "OK", "findings": [] },
    { "name": "CheckSubBlockBitmapValid",
      "description": "SubBlock-Segments in SubBlockDirectory are valid and valid content",
      "result": "OK", "findings": [] }
  ],
  "overallResult": "FAIL"
}"#;

fn passed(check: Checks, description: &str) -> CheckResult {
    CheckResult::new(check, description, CheckStatus::Ok, Vec::new())
        .expect("fixture checks are single bits")
}

/// What [`SAMPLE_REPORT_JSON`] decodes to for [`SAMPLE_FILE`].
pub fn sample_file_result() -> FileResult {
    let metadata = CheckResult::new(
        Checks::HAS_BASICALLY_VALID_METADATA,
        "Basic semantic checks of the XML-metadata",
        CheckStatus::Warn,
        vec![
            Finding::new(
                Severity::Warning,
                "document statistics gives 1 channels, whereas in XML-metadata 2 channels are found.",
                "",
            ),
            Finding::new(
                Severity::Info,
                "No sub block-information found for channel index 1, metadata pixelType: gray32float",
                "",
            ),
            Finding::new(
                Severity::Warning,
                "No valid ComponentBitCount information found in metadata for channel #1.",
                "",
            ),
        ],
    )
    .expect("fixture checks are single bits");

    let schema = CheckResult::new(
        Checks::HAS_XML_SCHEMA_VALID_METADATA,
        "Validate the XML-metadata against XSD-schema",
        CheckStatus::Fail,
        vec![
            Finding::new(
                Severity::Error,
                "(120,22): no declaration found for element 'RotationCenter'",
                "",
            ),
            Finding::new(
                Severity::Error,
                "(126,15): element 'RotationCenter' is not allowed for content model 'All(SessionMatrix?,HolderZeissName?,HolderZeissId?,HolderCwsId?,SessionCount?,SessionRotationAtStart?,CustomAttributes?)'",
                "",
            ),
        ],
    )
    .expect("fixture checks are single bits");

    FileResult::new(
        SAMPLE_FILE,
        CheckStatus::Fail,
        vec![
            passed(
                Checks::HAS_VALID_SUBBLOCK_POSITIONS,
                "SubBlock-Segment in SubBlockDirectory within file",
            ),
            passed(
                Checks::HAS_VALID_SUBBLOCK_SEGMENTS,
                "SubBlock-Segments in SubBlockDirectory are valid",
            ),
            passed(
                Checks::HAS_CONSISTENT_SUBBLOCK_DIMENSIONS,
                "Check subblock's coordinates for 'consistent dimensions'",
            ),
            passed(
                Checks::HAS_NO_DUPLICATE_SUBBLOCK_COORDINATES,
                "Check subblock's coordinates being unique",
            ),
            passed(
                Checks::DOES_NOT_USE_B_INDEX,
                "Check whether the document uses the deprecated 'B-index'",
            ),
            passed(
                Checks::HAS_ONLY_ONE_PIXEL_TYPE_PER_CHANNEL,
                "Check that the subblocks of a channel have the same pixeltype",
            ),
            passed(
                Checks::HAS_PLANE_INDICES_STARTING_AT_ZERO,
                "Check that planes indices start at 0",
            ),
            passed(
                Checks::HAS_CONSECUTIVE_PLANE_INDICES,
                "Check that planes have consecutive indices",
            ),
            passed(
                Checks::ALL_SUBBLOCKS_HAVE_M_INDEX,
                "Check if all subblocks have the M index",
            ),
            metadata,
            schema,
            passed(
                Checks::HAS_NO_OVERLAPPING_SCENES_AT_SCALE1,
                "Check if subblocks at pyramid-layer 0 of different scenes are overlapping",
            ),
            passed(
                Checks::HAS_VALID_SUBBLOCK_BITMAPS,
                "SubBlock-Segments in SubBlockDirectory are valid and valid content",
            ),
        ],
    )
    .with_version("0.6.5")
}

/// A minimal `czicheck.toml`.
pub const SAMPLE_CONFIG_TOML: &str = r#"[defaults]
checks = "default,xmlmetadataschema"
max_findings = 50
lax_parsing = true
"#;
