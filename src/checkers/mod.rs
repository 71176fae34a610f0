// SPDX-License-Identifier: PMPL-1.0-or-later
//! Category checkers and their rule registries.
//!
//! Each category module owns a fixed, ordered list of [`Rule`]s and a
//! severity weight table. A [`CategoryChecker`] runs the list over one
//! [`Document`] and turns the findings into a [`CategoryResult`].
//!
//! - **ARIA** (4.1.2, 2.4.1): names, roles, states, landmarks, tab order
//! - **Semantic** (1.3.1, 2.4.x, 3.1.1): structure, headings, lists, tables, forms, links
//! - **Image** (1.1.1): alt text presence and quality, decorative and complex images
//! - **Media** (1.2.x, 1.4.2): captions, transcripts, autoplay, controls
//! - **Visual** (1.4.x, 2.3.1, 2.4.7): contrast, spacing, resize, focus, motion

pub mod aria;
pub mod contrast;
pub mod image;
pub mod media;
pub mod semantic;
pub mod visual;

use crate::document::Document;
use crate::model::{Category, CategoryResult, Finding, Severity};
use crate::scoring::round1;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// One rule: a pure function from a document to findings
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: fn(&Document) -> Vec<Finding>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// Penalty subtracted from 100 per finding of each severity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl SeverityWeights {
    pub const fn new(critical: f64, high: f64, medium: f64, low: f64) -> Self {
        Self {
            critical,
            high,
            medium,
            low,
        }
    }

    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// `max(0, 100 - Σ weight)`, rounded to one decimal
    pub fn score(&self, findings: &[Finding]) -> f64 {
        let penalty: f64 = findings.iter().map(|f| self.weight(f.severity)).sum();
        round1((100.0 - penalty).max(0.0))
    }
}

/// Runs one category's rule list
#[derive(Debug, Clone, Copy)]
pub struct CategoryChecker {
    category: Category,
    weights: SeverityWeights,
    rules: &'static [Rule],
}

impl CategoryChecker {
    /// Checker for a category, or `None` for categories without rules
    pub fn for_category(category: Category) -> Option<Self> {
        let (weights, rules) = match category {
            Category::Aria => (aria::WEIGHTS, aria::RULES),
            Category::Semantic => (semantic::WEIGHTS, semantic::RULES),
            Category::Image => (image::WEIGHTS, image::RULES),
            Category::Media => (media::WEIGHTS, media::RULES),
            Category::Visual => (visual::WEIGHTS, visual::RULES),
            Category::Keyboard => return None,
        };
        Some(Self {
            category,
            weights,
            rules,
        })
    }

    /// Checker over an arbitrary rule list
    #[cfg(test)]
    pub(crate) fn with_rules(
        category: Category,
        weights: SeverityWeights,
        rules: &'static [Rule],
    ) -> Self {
        Self {
            category,
            weights,
            rules,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn weights(&self) -> SeverityWeights {
        self.weights
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Run every rule in order and score the result.
    ///
    /// A rule that panics is contained here: it contributes one high-severity
    /// finding and the remaining rules still run.
    pub fn run(&self, document: &Document) -> CategoryResult {
        let mut findings = Vec::new();
        let mut checks_run = 0;
        let mut checks_clean = 0;

        for rule in self.rules {
            checks_run += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| (rule.check)(document))) {
                Ok(rule_findings) => {
                    debug!(rule = rule.id, count = rule_findings.len(), "rule finished");
                    if rule_findings.is_empty() {
                        checks_clean += 1;
                    }
                    findings.extend(rule_findings);
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(category = %self.category, rule = rule.id, %reason, "rule faulted");
                    findings.push(rule_fault(self.category, rule.id, &reason));
                }
            }
        }

        let score = self.weights.score(&findings);
        CategoryResult {
            category: self.category,
            score,
            findings,
            checks_run,
            checks_clean,
        }
    }
}

/// Checkers for every category that has rules, in report order
pub fn registry() -> Vec<CategoryChecker> {
    Category::CHECKED
        .iter()
        .filter_map(|c| CategoryChecker::for_category(*c))
        .collect()
}

fn rule_fault(category: Category, rule_id: &str, reason: &str) -> Finding {
    Finding::new(
        &format!("{}-fault", rule_id),
        category,
        Severity::High,
        &format!("Rule {} could not be evaluated", rule_id),
    )
    .with_description(&format!("The rule failed with an internal error: {}", reason))
    .with_recommendation("Re-run the check; if the fault persists, report the page markup.")
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Whether `haystack` contains any of `keywords`
pub(crate) fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
