// SPDX-License-Identifier: PMPL-1.0-or-later
//! Score aggregation across categories.
//!
//! Category scores are combined with a fixed weight table and normalized by
//! the weights of the categories actually present. The table carries a
//! `keyboard` entry that no checker produces; it simply never contributes.

use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default category weights
pub const DEFAULT_WEIGHTS: &[(Category, f64)] = &[
    (Category::Aria, 0.25),
    (Category::Semantic, 0.20),
    (Category::Image, 0.15),
    (Category::Media, 0.15),
    (Category::Visual, 0.10),
    (Category::Keyboard, 0.15),
];

/// Letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

impl Grade {
    /// Eight-band grade used for the weighted total
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Grade::APlus
        } else if score >= 90.0 {
            Grade::A
        } else if score >= 85.0 {
            Grade::BPlus
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 75.0 {
            Grade::CPlus
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 65.0 {
            Grade::DPlus
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Five-band grade (A, B, C, D, F) used for the report summary
    pub fn coarse(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Qualitative WCAG conformance estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    A,
    #[serde(rename = "non-compliant")]
    NonCompliant,
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceLevel::Aaa => write!(f, "AAA"),
            ComplianceLevel::Aa => write!(f, "AA"),
            ComplianceLevel::A => write!(f, "A"),
            ComplianceLevel::NonCompliant => write!(f, "non-compliant"),
        }
    }
}

/// Projection of the score reachable by fixing mechanical issues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementPotential {
    pub potential_score: f64,
    pub improvement_points: f64,
    pub fixable_ratio: f64,
}

/// Weighted score aggregation
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: BTreeMap<Category, f64>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Engine with the default weight table
    pub fn new() -> Self {
        Self::with_weights(DEFAULT_WEIGHTS.iter().copied())
    }

    /// Engine with a custom weight table
    pub fn with_weights(weights: impl IntoIterator<Item = (Category, f64)>) -> Self {
        Self {
            weights: weights.into_iter().collect(),
        }
    }

    /// Weight of a category, if it appears in the table
    pub fn weight(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    /// Combine category scores into a total in [0, 100].
    ///
    /// Only categories in the weight table contribute, normalized by the sum
    /// of weights used. With no weighted category the unweighted mean of all
    /// supplied scores is used; with no scores at all the total is 0.
    pub fn total(&self, scores: &BTreeMap<Category, f64>) -> f64 {
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;

        for (category, score) in scores {
            if let Some(weight) = self.weight(*category) {
                weighted += score * weight;
                weight_sum += weight;
                debug!(category = %category, score, weight, "weighted category");
            }
        }

        let total = if weight_sum > 0.0 {
            weighted / weight_sum
        } else if scores.is_empty() {
            0.0
        } else {
            scores.values().sum::<f64>() / scores.len() as f64
        };

        round1(total.clamp(0.0, 100.0))
    }

    /// Eight-band letter grade
    pub fn grade(&self, score: f64) -> Grade {
        Grade::from_score(score)
    }

    /// Compliance level by thresholds 95 / 80 / 60
    pub fn compliance_level(&self, score: f64) -> ComplianceLevel {
        if score >= 95.0 {
            ComplianceLevel::Aaa
        } else if score >= 80.0 {
            ComplianceLevel::Aa
        } else if score >= 60.0 {
            ComplianceLevel::A
        } else {
            ComplianceLevel::NonCompliant
        }
    }

    /// `current + (100 - current) * fixable / total`, clamped to 100
    pub fn improvement_potential(
        &self,
        current: f64,
        fixable_issues: usize,
        total_issues: usize,
    ) -> ImprovementPotential {
        if total_issues == 0 {
            return ImprovementPotential {
                potential_score: current,
                improvement_points: 0.0,
                fixable_ratio: 1.0,
            };
        }

        let ratio = fixable_issues as f64 / total_issues as f64;
        let points = (100.0 - current) * ratio;
        let potential = (current + points).min(100.0);

        ImprovementPotential {
            potential_score: round1(potential),
            improvement_points: round1(points),
            fixable_ratio: (ratio * 100.0).round() / 100.0,
        }
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(Category, f64)]) -> BTreeMap<Category, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_weighted_total_without_keyboard() {
        let engine = ScoringEngine::new();
        let total = engine.total(&scores(&[
            (Category::Aria, 80.0),
            (Category::Semantic, 90.0),
            (Category::Image, 70.0),
            (Category::Media, 100.0),
            (Category::Visual, 60.0),
        ]));
        // 69.5 / 0.85
        assert!((total - 81.8).abs() < 0.05, "got {}", total);
    }

    #[test]
    fn test_single_category_total_is_its_score() {
        let engine = ScoringEngine::new();
        assert_eq!(engine.total(&scores(&[(Category::Visual, 42.0)])), 42.0);
    }

    #[test]
    fn test_unweighted_fallback() {
        let engine = ScoringEngine::with_weights([(Category::Keyboard, 1.0)]);
        let total = engine.total(&scores(&[(Category::Aria, 50.0), (Category::Image, 100.0)]));
        assert_eq!(total, 75.0);
    }

    #[test]
    fn test_empty_total() {
        assert_eq!(ScoringEngine::new().total(&BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_total_in_bounds() {
        let engine = ScoringEngine::new();
        let total = engine.total(&scores(&[(Category::Aria, 0.0), (Category::Semantic, 100.0)]));
        assert!((0.0..=100.0).contains(&total));
    }

    #[test]
    fn test_grades() {
        assert_eq!(Grade::from_score(95.0), Grade::APlus);
        assert_eq!(Grade::from_score(86.0), Grade::BPlus);
        assert_eq!(Grade::from_score(64.9), Grade::D);
        assert_eq!(Grade::from_score(10.0), Grade::F);
        assert_eq!(Grade::coarse(95.0), Grade::A);
        assert_eq!(Grade::coarse(79.9), Grade::C);
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(serde_json::to_string(&Grade::CPlus).unwrap(), "\"C+\"");
    }

    #[test]
    fn test_compliance_levels() {
        let engine = ScoringEngine::new();
        assert_eq!(engine.compliance_level(97.0), ComplianceLevel::Aaa);
        assert_eq!(engine.compliance_level(80.0), ComplianceLevel::Aa);
        assert_eq!(engine.compliance_level(60.0), ComplianceLevel::A);
        assert_eq!(engine.compliance_level(59.9), ComplianceLevel::NonCompliant);
    }

    #[test]
    fn test_improvement_potential() {
        let engine = ScoringEngine::new();
        let potential = engine.improvement_potential(60.0, 1, 4);
        assert_eq!(potential.improvement_points, 10.0);
        assert_eq!(potential.potential_score, 70.0);
        assert_eq!(potential.fixable_ratio, 0.25);

        let all = engine.improvement_potential(60.0, 4, 4);
        assert_eq!(all.potential_score, 100.0);

        let none = engine.improvement_potential(88.0, 0, 0);
        assert_eq!(none.potential_score, 88.0);
        assert_eq!(none.fixable_ratio, 1.0);
    }
}
