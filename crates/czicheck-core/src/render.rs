use czicheck_domain::FileResult;
use czicheck_types::{AGGREGATES, CHECKS, CheckStatus};

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Ok => "OK",
        CheckStatus::Warn => "WARN",
        CheckStatus::Fail => "FAIL",
    }
}

/// Human-readable report for one file.
pub fn render_text_for_result(result: &FileResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} - {}\n",
        result.file(),
        status_label(result.file_status())
    ));
    if let Some(version) = result.version() {
        out.push_str(&format!("  engine output version: {version}\n"));
    }

    for r in result.check_results() {
        let name = r.check().info().map_or("(unattributed)", |info| info.name);
        out.push_str(&format!(
            "  [{:<4}] {name}: {}\n",
            status_label(r.status()),
            r.description()
        ));
        for f in r.findings() {
            out.push_str(&format!("         {}: {}", f.severity.as_str(), f.description));
            if !f.details.is_empty() {
                out.push_str(&format!(" ({})", f.details));
            }
            out.push('\n');
        }
    }

    if let Some(diag) = result.diagnostic() {
        out.push_str(&format!("  diagnostic: {diag}\n"));
    }
    out
}

pub fn render_json_for_results(results: &[FileResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// The alias table, one check per line, followed by the aggregate keywords.
pub fn render_checks_table() -> String {
    let mut out = String::from("| Check | Short | Legacy | Default | Description |\n");
    out.push_str("|---|---|---|---|---|\n");
    for info in CHECKS.iter() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            info.name,
            info.short_name,
            info.legacy_name,
            if info.is_opt_in() { "no" } else { "yes" },
            info.description
        ));
    }
    out.push('\n');
    for (keyword, mask) in AGGREGATES.iter().filter(|(_, m)| !m.is_empty()) {
        out.push_str(&format!("{keyword}: {:#06x}\n", mask.bits()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use czicheck_domain::CheckResult;
    use czicheck_types::{Checks, Finding, Severity};

    fn sample() -> FileResult {
        FileResult::new(
            "sample.czi",
            CheckStatus::Warn,
            vec![
                CheckResult::new(
                    Checks::HAS_VALID_SUBBLOCK_POSITIONS,
                    "SubBlock-Segment in SubBlockDirectory within file",
                    CheckStatus::Ok,
                    vec![],
                )
                .unwrap(),
                CheckResult::new(
                    Checks::DOES_NOT_USE_B_INDEX,
                    "Check whether the document uses the deprecated 'B-index'",
                    CheckStatus::Warn,
                    vec![Finding::new(Severity::Warning, "B-index used", "")],
                )
                .unwrap(),
            ],
        )
        .with_version("0.6.5")
    }

    #[test]
    fn text_lists_checks_and_findings() {
        let text = render_text_for_result(&sample());
        assert!(text.starts_with("sample.czi - WARN\n"), "{text}");
        assert!(text.contains("engine output version: 0.6.5"));
        assert!(text.contains("[OK  ] HasValidSubBlockPositions:"));
        assert!(text.contains("[WARN] DoesNotUseBIndex:"));
        assert!(text.contains("warning: B-index used\n"));
        assert!(!text.contains("diagnostic"));
    }

    #[test]
    fn text_shows_diagnostic() {
        let text = render_text_for_result(&FileResult::failed("x.czi", "No output"));
        assert!(text.contains("x.czi - FAIL"));
        assert!(text.contains("diagnostic: No output"));
    }

    #[test]
    fn json_uses_check_names() {
        let json = render_json_for_results(&[sample()]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["file"], "sample.czi");
        assert_eq!(value[0]["file_status"], "warn");
        assert_eq!(value[0]["version"], "0.6.5");
        assert_eq!(value[0]["check_results"][1]["check"], "DoesNotUseBIndex");
        assert_eq!(
            value[0]["check_results"][1]["findings"][0]["severity"],
            "warning"
        );
        assert!(value[0].get("diagnostic").is_none());
    }

    #[test]
    fn checks_table_has_every_row() {
        let table = render_checks_table();
        for info in CHECKS.iter() {
            assert!(table.contains(info.short_name), "{}", info.name);
        }
        let xml_row =
            "| HasXmlSchemaValidMetadata | xmlmetadataschema | XmlMetadataSchemaValidation | no |";
        assert!(table.contains(xml_row));
        assert!(table.contains("all: 0xffff"));
        assert!(table.contains("default: 0xebff"));
        assert!(table.contains("optin: 0x1400"));
        assert!(!table.contains("none:"));
    }
}
