// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for a11yscore

use a11yscore::config::{load_options, CheckOptions};
use a11yscore::model::{Category, Report, Severity};
use a11yscore::orchestrator::AccessibilityChecker;
use a11yscore::report::{render, OutputFormat};
use a11yscore::scanner;
use a11yscore::scoring::ComplianceLevel;
use a11yscore::source::FilePageSource;
use std::path::Path;

async fn check_fixture(name: &str) -> Report {
    let checker = AccessibilityChecker::new();
    checker
        .check_page(
            &FilePageSource::new(),
            &format!("tests/fixtures/{}", name),
            &CheckOptions::default(),
        )
        .await
        .expect("fixture should be readable")
}

fn rule_ids(report: &Report, severity: Severity) -> Vec<&str> {
    report
        .by_severity(severity)
        .iter()
        .map(|f| f.rule_id.as_str())
        .collect()
}

#[tokio::test]
async fn test_accessible_fixture() {
    let report = check_fixture("accessible.html").await;

    // Accessible page should have no high or critical findings
    let high = rule_ids(&report, Severity::High);
    assert!(high.is_empty(), "Accessible fixture should have no high findings, got {:?}", high);
    assert!(report.by_severity(Severity::Critical).is_empty());

    assert!(
        report.total_score >= 85.0,
        "Accessible fixture should score well, got {:.1}",
        report.total_score
    );
    assert_eq!(report.category_scores.len(), 5);
    assert_eq!(report.category_score(Category::Media), Some(100.0));

    let page = report.page.as_ref().expect("metadata attached");
    assert_eq!(page.title, "Riverside Community Library");
    assert_eq!(page.language, "en");
    assert_eq!(page.charset, "utf-8");
}

#[tokio::test]
async fn test_inaccessible_fixture() {
    let report = check_fixture("inaccessible.html").await;

    // Inaccessible page should have many findings
    assert!(
        report.issues.len() >= 20,
        "Inaccessible fixture should have many findings, got {}",
        report.issues.len()
    );

    let high = rule_ids(&report, Severity::High);
    for rule in [
        "img-alt", "image-links", "aria-labels", "aria-roles", "aria-hidden-focusable",
        "table-structure", "form-structure", "link-purpose", "page-title",
        "video-captions", "audio-transcripts", "autoplay", "resize", "flashing",
    ] {
        assert!(high.contains(&rule), "expected a high finding from {}, got {:?}", rule, high);
    }

    assert!(!report.by_rule("color-contrast").is_empty());
    assert!(!report.by_rule("color-only-information").is_empty());
    assert!(!report.by_rule("focus-indicators").is_empty());
    assert_eq!(report.summary.compliance_level, ComplianceLevel::NonCompliant);
    assert!(report.summary.fixable_issues > 0);
    assert!(report.summary.improvement.potential_score > report.total_score);
}

#[tokio::test]
async fn test_partial_fixture_sits_between() {
    let good = check_fixture("accessible.html").await;
    let partial = check_fixture("partial.html").await;
    let bad = check_fixture("inaccessible.html").await;

    // Partial page has some issues but not as many as inaccessible
    assert!(!partial.issues.is_empty());
    assert!(partial.issues.len() < bad.issues.len());
    assert!(partial.total_score < good.total_score);
    assert!(partial.total_score > bad.total_score);

    assert!(!partial.by_rule("heading-hierarchy").is_empty(), "h1 -> h3 skips a level");
    assert!(!partial.by_rule("complex-images").is_empty(), "chart image without description");
}

#[tokio::test]
async fn test_scores_stay_in_bounds() {
    for name in ["accessible.html", "inaccessible.html", "partial.html"] {
        let report = check_fixture(name).await;
        assert!((0.0..=100.0).contains(&report.total_score));
        for score in report.category_scores.values() {
            assert!((0.0..=100.0).contains(&score.score), "{} {:?}", name, score);
            assert!(score.passed_checks <= score.total_checks);
        }
    }
}

#[tokio::test]
async fn test_scan_fixtures_directory() {
    let checker = AccessibilityChecker::new();
    let reports = scanner::scan_directory(&checker, Path::new("tests/fixtures"), &CheckOptions::default())
        .await
        .expect("scan should succeed");

    let names: Vec<_> = reports
        .iter()
        .map(|r| Path::new(&r.url).file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["accessible.html", "inaccessible.html", "partial.html"]);
}

#[tokio::test]
async fn test_disabled_categories_are_omitted() {
    let checker = AccessibilityChecker::new();
    let mut options = CheckOptions::default();
    options.set_enabled(Category::Media, false);
    options.set_enabled(Category::Visual, false);

    let report = checker
        .check_page(&FilePageSource::new(), "tests/fixtures/inaccessible.html", &options)
        .await
        .unwrap();

    assert_eq!(report.summary.categories_checked, 3);
    assert!(report.by_category(Category::Media).is_empty());
    assert!(report.by_category(Category::Visual).is_empty());
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let checker = AccessibilityChecker::new();
    let result = checker
        .check_page(&FilePageSource::new(), "tests/fixtures/missing.html", &CheckOptions::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_report_json_shape() {
    let report = check_fixture("partial.html").await;
    let rendered = render(&[report], OutputFormat::Json);
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid JSON");

    for field in ["url", "total_score", "category_scores", "issues", "summary", "checked_at", "check_duration"] {
        assert!(parsed.get(field).is_some(), "missing field {}", field);
    }
    let issue = &parsed["issues"][0];
    assert!(issue["type"].is_string());
    assert!(issue["severity"].is_string());
    assert!(issue["wcag_reference"].as_str().unwrap_or("WCAG").starts_with("WCAG"));
    assert!(parsed["summary"]["grade"].is_string());
}

#[test]
fn test_load_options_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("a11y.toml");
    std::fs::write(&toml_path, "enable_media_check = false\nwait_time = 12\n").unwrap();
    let options = load_options(&toml_path).unwrap();
    assert!(!options.enable_media_check);
    assert!(options.enable_aria_check);
    assert_eq!(options.wait_time, 12);

    let json_path = dir.path().join("a11y.json");
    std::fs::write(&json_path, r#"{"enable_visual_check": false}"#).unwrap();
    let options = load_options(&json_path).unwrap();
    assert!(!options.enable_visual_check);
    assert_eq!(options.wait_time, 5);

    let missing = load_options(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(missing, CheckOptions::default());
}
