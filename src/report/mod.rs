// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report serialization.
//!
//! Supports two output formats:
//! - JSON: the report objects as produced by the orchestrator
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::model::{Report, Severity};
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render reports in the requested format
pub fn render(reports: &[Report], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => render_json(reports),
        OutputFormat::Sarif => render_sarif(reports),
    }
}

/// One report renders as an object, several as an array
fn render_json(reports: &[Report]) -> String {
    let rendered = match reports {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    properties: SarifProperties,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
struct SarifRegion {
    snippet: SarifMessage,
}

#[derive(Debug, Serialize)]
struct SarifProperties {
    category: String,
    severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    wcag: Option<String>,
    fixable: bool,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

fn render_sarif(reports: &[Report]) -> String {
    let results: Vec<SarifResult> = reports
        .iter()
        .flat_map(|report| report.issues.iter().map(move |f| (report, f)))
        .map(|(report, f)| SarifResult {
            rule_id: f.rule_id.clone(),
            level: sarif_level(f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: report.url.clone(),
                    },
                    region: f.element.as_ref().map(|snippet| SarifRegion {
                        snippet: SarifMessage {
                            text: snippet.clone(),
                        },
                    }),
                },
            }],
            properties: SarifProperties {
                category: f.category.to_string(),
                severity: f.severity.to_string(),
                wcag: f.wcag_reference.clone(),
                fixable: f.fixable,
            },
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "a11yscore".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckOptions;
    use crate::orchestrator::AccessibilityChecker;

    async fn sample_report(target: &str) -> Report {
        AccessibilityChecker::new()
            .evaluate(r#"<html><body><img src="photo.jpg"></body></html>"#, target, &CheckOptions::default())
            .await
    }

    #[tokio::test]
    async fn test_json_single_report_is_object() {
        let report = sample_report("index.html").await;
        let rendered = render(&[report], OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid JSON");
        assert!(parsed.is_object());
        assert_eq!(parsed["url"], "index.html");
        assert!(parsed["issues"].is_array());
        assert!(parsed["category_scores"]["aria"]["score"].is_number());
        assert!(parsed["issues"][0]["type"].is_string());
    }

    #[tokio::test]
    async fn test_json_many_reports_is_array() {
        let reports = vec![sample_report("a.html").await, sample_report("b.html").await];
        let rendered = render(&reports, OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid JSON");
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_sarif_report() {
        let report = sample_report("index.html").await;
        let issue_count = report.issues.len();
        let rendered = render(&[report], OutputFormat::Sarif);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");

        let results = parsed["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), issue_count);
        let img_alt = results.iter().find(|r| r["ruleId"] == "img-alt").unwrap();
        assert_eq!(img_alt["level"], "error");
        assert_eq!(
            img_alt["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "index.html"
        );
    }

    #[test]
    fn test_sarif_levels() {
        assert_eq!(sarif_level(Severity::Critical), "error");
        assert_eq!(sarif_level(Severity::Medium), "warning");
        assert_eq!(sarif_level(Severity::Low), "note");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("SARIF".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("text".parse::<OutputFormat>().is_err());
    }
}
