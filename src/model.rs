// SPDX-License-Identifier: PMPL-1.0-or-later
//! Findings, per-category results and the unified report.
//!
//! The JSON shape of [`Report`] keeps the field names consumers of the
//! HTTP boundary already depend on (`url`, `total_score`,
//! `category_scores`, `issues`, `summary`, `checked_at`, `check_duration`).

use crate::scoring::{ComplianceLevel, Grade, ImprovementPotential};
use crate::source::PageMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accessibility dimension a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// WAI-ARIA names, roles, states and landmarks
    Aria,
    /// Document structure, headings, tables, forms, links
    Semantic,
    /// Image alternatives
    Image,
    /// Captions, transcripts and playback control
    Media,
    /// Contrast, spacing, motion and layout
    Visual,
    /// Weighted by the scoring engine but never produced by a checker
    Keyboard,
}

impl Category {
    /// Categories that have a checker, in report order
    pub const CHECKED: [Category; 5] = [
        Category::Aria,
        Category::Semantic,
        Category::Image,
        Category::Media,
        Category::Visual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Aria => "aria",
            Category::Semantic => "semantic",
            Category::Image => "image",
            Category::Media => "media",
            Category::Visual => "visual",
            Category::Keyboard => "keyboard",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One detected accessibility defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that produced this finding (e.g., "img-alt")
    pub rule_id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub description: String,
    /// Truncated outer HTML of the offending element
    pub element: Option<String>,
    pub recommendation: String,
    /// WCAG success criterion reference
    pub wcag_reference: Option<String>,
    /// Whether the fix is a mechanical attribute or element addition
    pub fixable: bool,
}

impl Finding {
    /// Create a new finding
    pub fn new(rule_id: &str, category: Category, severity: Severity, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            category,
            severity,
            message: message.to_string(),
            description: String::new(),
            element: None,
            recommendation: String::new(),
            wcag_reference: None,
            fixable: false,
        }
    }

    /// Set the longer description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the element snippet
    pub fn with_element(mut self, element: String) -> Self {
        self.element = Some(element);
        self
    }

    /// Set the recommended remediation
    pub fn with_recommendation(mut self, recommendation: &str) -> Self {
        self.recommendation = recommendation.to_string();
        self
    }

    /// Set the WCAG criterion, e.g. "1.1.1 Non-text Content"
    pub fn with_wcag(mut self, criterion: &str) -> Self {
        self.wcag_reference = Some(format!("WCAG 2.1 - {}", criterion));
        self
    }

    /// Mark as fixable
    pub fn as_fixable(mut self) -> Self {
        self.fixable = true;
        self
    }
}

/// Outcome of one category checker over one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub score: f64,
    pub findings: Vec<Finding>,
    /// Rules executed
    pub checks_run: usize,
    /// Rules that produced no finding
    pub checks_clean: usize,
}

impl CategoryResult {
    /// Placeholder for a category whose pass could not run at all
    pub fn fault(category: Category, reason: &str) -> Self {
        let finding = Finding::new(
            &format!("{}-checker-fault", category),
            category,
            Severity::High,
            &format!("The {} check could not be executed", category),
        )
        .with_description(&format!("The check failed with an internal error: {}", reason))
        .with_recommendation("Verify that the page source is well-formed HTML and re-run the check.");

        Self {
            category,
            score: 0.0,
            findings: vec![finding],
            checks_run: 0,
            checks_clean: 0,
        }
    }

    /// Wire form used in the report's `category_scores`
    pub fn to_score(&self) -> CategoryScore {
        CategoryScore {
            category: self.category,
            score: self.score,
            max_score: 100.0,
            issues_count: self.findings.len(),
            passed_checks: self.checks_clean,
            total_checks: self.checks_run,
        }
    }
}

/// Per-category entry of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    pub max_score: f64,
    pub issues_count: usize,
    pub passed_checks: usize,
    pub total_checks: usize,
}

/// Aggregate counts and grades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_issues: usize,
    pub critical_issues: usize,
    pub fixable_issues: usize,
    pub categories_checked: usize,
    /// A-F grade over the unweighted mean of category scores
    pub overall_grade: Grade,
    /// A+-F grade over the weighted total
    pub grade: Grade,
    pub compliance_level: ComplianceLevel,
    pub improvement: ImprovementPotential,
}

/// Result of evaluating one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Target identifier (URL or file path)
    pub url: String,
    pub total_score: f64,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    pub issues: Vec<Finding>,
    pub summary: Summary,
    pub checked_at: DateTime<Utc>,
    /// Seconds spent evaluating
    pub check_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMetadata>,
}

impl Report {
    /// Findings with the given severity
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.issues.iter().filter(|f| f.severity == severity).collect()
    }

    /// Findings belonging to one category
    pub fn by_category(&self, category: Category) -> Vec<&Finding> {
        self.issues.iter().filter(|f| f.category == category).collect()
    }

    /// Findings produced by one rule
    pub fn by_rule(&self, rule_id: &str) -> Vec<&Finding> {
        self.issues.iter().filter(|f| f.rule_id == rule_id).collect()
    }

    /// Score of one category, if it was checked
    pub fn category_score(&self, category: Category) -> Option<f64> {
        self.category_scores.get(&category).map(|s| s.score)
    }
}
