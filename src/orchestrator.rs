// SPDX-License-Identifier: PMPL-1.0-or-later
//! Evaluation pipeline: parse once, run every enabled category checker
//! concurrently, join, score, and assemble the [`Report`].

use crate::checkers::{self, CategoryChecker};
use crate::config::CheckOptions;
use crate::document::Document;
use crate::error::Result;
use crate::model::{Category, CategoryResult, Report, Severity, Summary};
use crate::scoring::{round1, Grade, ScoringEngine};
use crate::source::PageSource;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the category checkers and the scoring engine over HTML snapshots
#[derive(Debug, Clone)]
pub struct AccessibilityChecker {
    checkers: Vec<CategoryChecker>,
    scoring: ScoringEngine,
}

impl Default for AccessibilityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessibilityChecker {
    /// Checker with every category registry and the default weights
    pub fn new() -> Self {
        Self::with_scoring(ScoringEngine::new())
    }

    pub fn with_scoring(scoring: ScoringEngine) -> Self {
        Self {
            checkers: checkers::registry(),
            scoring,
        }
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Fetch `target` through `source` and evaluate it.
    ///
    /// Fetch failures are returned as errors; everything after the fetch
    /// always produces a report.
    pub async fn check_page(
        &self,
        source: &dyn PageSource,
        target: &str,
        options: &CheckOptions,
    ) -> Result<Report> {
        let snapshot = source.fetch(target, options).await?;
        let mut report = self.evaluate(&snapshot.html, target, options).await;
        report.page = Some(snapshot.metadata);
        Ok(report)
    }

    /// Evaluate one HTML snapshot.
    ///
    /// Every enabled category appears in the report. A category whose
    /// checker could not run gets a fault placeholder scoring 0.
    pub async fn evaluate(&self, html: &str, target: &str, options: &CheckOptions) -> Report {
        let started = Instant::now();
        let enabled: Vec<CategoryChecker> = self
            .checkers
            .iter()
            .filter(|c| options.is_enabled(c.category()))
            .copied()
            .collect();

        info!(page = target, categories = enabled.len(), "evaluating page");

        let source = html.to_string();
        let parsed = match tokio::task::spawn_blocking(move || Document::parse(&source)).await {
            Ok(Ok(document)) => Ok(Arc::new(document)),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("parser task failed: {}", e)),
        };

        let results = match parsed {
            Ok(document) => run_checkers(&enabled, document).await,
            Err(reason) => {
                warn!(page = target, %reason, "document could not be parsed");
                enabled
                    .iter()
                    .map(|c| (c.category(), CategoryResult::fault(c.category(), &reason)))
                    .collect()
            }
        };

        self.build_report(target, results, started)
    }

    fn build_report(
        &self,
        target: &str,
        results: BTreeMap<Category, CategoryResult>,
        started: Instant,
    ) -> Report {
        let scores: BTreeMap<Category, f64> =
            results.iter().map(|(c, r)| (*c, r.score)).collect();
        let total_score = self.scoring.total(&scores);

        let issues: Vec<_> = results
            .values()
            .flat_map(|r| r.findings.iter().cloned())
            .collect();
        let fixable_issues = issues.iter().filter(|f| f.fixable).count();

        let mean = if scores.is_empty() {
            0.0
        } else {
            round1(scores.values().sum::<f64>() / scores.len() as f64)
        };

        let summary = Summary {
            total_issues: issues.len(),
            critical_issues: issues
                .iter()
                .filter(|f| f.severity == Severity::Critical)
                .count(),
            fixable_issues,
            categories_checked: results.len(),
            overall_grade: Grade::coarse(mean),
            grade: self.scoring.grade(total_score),
            compliance_level: self.scoring.compliance_level(total_score),
            improvement: self
                .scoring
                .improvement_potential(total_score, fixable_issues, issues.len()),
        };

        let category_scores = results
            .iter()
            .map(|(c, r)| (*c, r.to_score()))
            .collect();

        info!(
            page = target,
            total_score,
            issues = summary.total_issues,
            grade = %summary.grade,
            "evaluation complete"
        );

        Report {
            url: target.to_string(),
            total_score,
            category_scores,
            issues,
            summary,
            checked_at: Utc::now(),
            check_duration: started.elapsed().as_secs_f64(),
            page: None,
        }
    }
}

/// Fan out one blocking task per checker and join them all
async fn run_checkers(
    checkers: &[CategoryChecker],
    document: Arc<Document>,
) -> BTreeMap<Category, CategoryResult> {
    let handles: Vec<_> = checkers
        .iter()
        .map(|checker| {
            let checker = *checker;
            let document = Arc::clone(&document);
            let handle = tokio::task::spawn_blocking(move || checker.run(&document));
            (checker.category(), handle)
        })
        .collect();

    let mut results = BTreeMap::new();
    for (category, handle) in handles {
        let result = match handle.await {
            Ok(result) => {
                debug!(
                    category = %category,
                    findings = result.findings.len(),
                    score = result.score,
                    "checker finished"
                );
                result
            }
            Err(e) => {
                warn!(category = %category, error = %e, "checker task failed");
                CategoryResult::fault(category, &e.to_string())
            }
        };
        results.insert(category, result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticPageSource;

    const CLEAN_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Clean reference page</title>
</head>
<body>
  <a href="#content" style="text-decoration: underline">Skip to main content</a>
  <header><h1>Clean reference page</h1></header>
  <nav aria-label="Primary"><a href="/about" style="text-decoration: underline">About us</a></nav>
  <main id="content">
    <h2>Section</h2>
    <p>Plain text content.</p>
  </main>
  <footer><p>Footer</p></footer>
</body>
</html>"##;

    fn options_with(categories: &[Category]) -> CheckOptions {
        let mut options = CheckOptions::default();
        for category in Category::CHECKED {
            options.set_enabled(category, categories.contains(&category));
        }
        options
    }

    #[tokio::test]
    async fn test_evaluate_is_idempotent() {
        let checker = AccessibilityChecker::new();
        let options = CheckOptions::default();
        let html = r##"<html><body>
            <img src="photo.jpg" class="x" width="300" height="200" data-a="1" data-b="2">
            <div role="checkbox" aria-expanded="yes" aria-hidden="maybe" tabindex="3">Agree</div>
            <video src="v.mp4"></video><a href="#">click here</a>
        </body></html>"##;

        let first = checker.evaluate(html, "page.html", &options).await;
        let mut second = checker.evaluate(html, "page.html", &options).await;

        second.checked_at = first.checked_at;
        second.check_duration = first.check_duration;
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let img = first.by_rule("img-alt")[0].element.clone().unwrap();
        assert_eq!(
            img,
            r#"<img src="photo.jpg" class="x" width="300" height="200" data-a="1" data-b="2">"#
        );
        let properties: Vec<_> = first
            .by_rule("aria-properties")
            .iter()
            .map(|f| f.message.clone())
            .collect();
        assert_eq!(
            properties,
            vec![
                "Invalid ARIA boolean value: aria-expanded='yes'",
                "Invalid ARIA boolean value: aria-hidden='maybe'",
            ]
        );

        for _ in 0..10 {
            let mut again = checker.evaluate(html, "page.html", &options).await;
            again.checked_at = first.checked_at;
            again.check_duration = first.check_duration;
            assert_eq!(first, again);
        }
    }

    #[tokio::test]
    async fn test_clean_page_scores_full_marks() {
        let checker = AccessibilityChecker::new();
        let report = checker.evaluate(CLEAN_PAGE, "clean.html", &CheckOptions::default()).await;

        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.category_scores.len(), 5);
        for score in report.category_scores.values() {
            assert_eq!(score.score, 100.0, "{:?}", score);
            assert_eq!(score.issues_count, 0);
            assert!(score.total_checks > 0);
            assert_eq!(score.passed_checks, score.total_checks, "{:?}", score);
        }
        assert_eq!(report.total_score, 100.0);
    }

    #[tokio::test]
    async fn test_every_enabled_category_is_reported() {
        let checker = AccessibilityChecker::new();
        let options = options_with(&[Category::Aria, Category::Visual]);
        let report = checker.evaluate(CLEAN_PAGE, "clean.html", &options).await;

        let categories: Vec<_> = report.category_scores.keys().copied().collect();
        assert_eq!(categories, vec![Category::Aria, Category::Visual]);
        assert_eq!(report.summary.categories_checked, 2);
        assert!(report.total_score >= 0.0 && report.total_score <= 100.0);
    }

    #[tokio::test]
    async fn test_unparseable_document_gets_fault_placeholders() {
        let checker = AccessibilityChecker::new();
        let report = checker.evaluate("   ", "empty.html", &CheckOptions::default()).await;

        assert_eq!(report.category_scores.len(), 5);
        for score in report.category_scores.values() {
            assert_eq!(score.score, 0.0);
            assert_eq!(score.total_checks, 0);
            assert_eq!(score.issues_count, 1);
        }
        assert_eq!(report.issues.len(), 5);
        assert!(report.issues.iter().all(|f| f.severity == Severity::High));
        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.summary.overall_grade, Grade::F);
    }

    #[tokio::test]
    async fn test_no_categories_enabled() {
        let checker = AccessibilityChecker::new();
        let report = checker.evaluate(CLEAN_PAGE, "clean.html", &options_with(&[])).await;
        assert!(report.category_scores.is_empty());
        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.summary.grade, Grade::F);
    }

    #[tokio::test]
    async fn test_main_landmark_case() {
        let checker = AccessibilityChecker::new();
        let options = options_with(&[Category::Aria]);
        let landmark_mediums = |report: &Report| {
            report
                .by_rule("landmark-roles")
                .iter()
                .filter(|f| f.severity == Severity::Medium)
                .count()
        };

        let without = checker
            .evaluate("<html><body><nav>menu</nav><div>content</div></body></html>", "a", &options)
            .await;
        assert_eq!(landmark_mediums(&without), 1);

        let with = checker
            .evaluate("<html><body><nav>menu</nav><main>content</main></body></html>", "a", &options)
            .await;
        assert_eq!(landmark_mediums(&with), 0);
        assert!(with.issues.len() < without.issues.len());
    }

    #[tokio::test]
    async fn test_video_caption_case() {
        let checker = AccessibilityChecker::new();
        let options = options_with(&[Category::Media]);

        let bare = checker
            .evaluate(r#"<video src="v.mp4" controls></video>"#, "v", &options)
            .await;
        assert_eq!(bare.by_severity(Severity::High).len(), 1);
        assert_eq!(bare.by_rule("video-captions").len(), 1);

        let captioned = checker
            .evaluate(
                r#"<video src="v.mp4" controls><track kind="captions" src="a.vtt" srclang="en" label="English"></video>"#,
                "v",
                &options,
            )
            .await;
        assert!(captioned.by_rule("video-captions").is_empty());
        assert!(captioned.by_severity(Severity::High).is_empty());
    }

    #[tokio::test]
    async fn test_check_page_attaches_metadata() {
        let checker = AccessibilityChecker::new();
        let source = StaticPageSource::new(CLEAN_PAGE, "https://example.com/");
        let report = checker
            .check_page(&source, "https://example.com/", &CheckOptions::default())
            .await
            .unwrap();

        let page = report.page.as_ref().unwrap();
        assert_eq!(page.title, "Clean reference page");
        assert_eq!(page.language, "en");
        assert_eq!(report.url, "https://example.com/");
        assert_eq!(report.summary.categories_checked, 5);
    }
}
