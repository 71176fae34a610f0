// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11yscore - WCAG accessibility rule engine and weighted scoring
//!
//! Evaluates one static HTML snapshot against five independent rule
//! categories, scores each category from its findings, and combines the
//! category scores into a weighted total with a letter grade and a
//! compliance level.
//!
//! ## Categories
//!
//! - **ARIA** (4.1.2/2.4.1): Names, roles, states, landmarks, tab order
//! - **Semantic** (1.3.1/2.4.x/3.1.1): Structure, headings, lists, tables, forms
//! - **Image** (1.1.1): Alt text presence and quality
//! - **Media** (1.2.x/1.4.2): Captions, transcripts, autoplay, controls
//! - **Visual** (1.4.x/2.3.1/2.4.7): Contrast, spacing, resize, focus, motion
//!
//! ## Example
//!
//! ```no_run
//! use a11yscore::config::CheckOptions;
//! use a11yscore::orchestrator::AccessibilityChecker;
//!
//! # async fn run() {
//! let checker = AccessibilityChecker::new();
//! let report = checker
//!     .evaluate("<html lang=\"en\"><body><main>Hi</main></body></html>", "inline", &CheckOptions::default())
//!     .await;
//! println!("{} ({})", report.total_score, report.summary.grade);
//! # }
//! ```

pub mod checkers;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod scanner;
pub mod scoring;
pub mod source;
