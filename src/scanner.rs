// SPDX-License-Identifier: PMPL-1.0-or-later
//! Directory scanner for evaluating every HTML snapshot under a tree.
//!
//! Walks directory trees, picks up HTML files and evaluates each one.

use crate::config::CheckOptions;
use crate::error::Result;
use crate::model::Report;
use crate::orchestrator::AccessibilityChecker;
use crate::source::FilePageSource;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File extensions to scan
const SCANNABLE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Directories to skip
const SKIP_DIRS: &[&str] = &[
    "node_modules", ".git", "target", "dist", "build",
    "_build", "vendor", ".next", ".nuxt", "coverage",
];

/// HTML files under `dir`, sorted by path
pub fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden and excluded directories
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() && e.depth() > 0 {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |ext| SCANNABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    files.sort();
    files
}

/// Evaluate every HTML file under `dir`; reports come back in path order.
///
/// Files that cannot be read are logged and skipped.
pub async fn scan_directory(
    checker: &AccessibilityChecker,
    dir: &Path,
    options: &CheckOptions,
) -> Result<Vec<Report>> {
    info!("Scanning directory: {}", dir.display());

    let source = FilePageSource::new();
    let mut reports = Vec::new();

    for path in collect_html_files(dir) {
        let target = path.display().to_string();
        match checker.check_page(&source, &target, options).await {
            Ok(report) => reports.push(report),
            Err(e) => warn!("Skipping {}: {}", target, e),
        }
    }

    info!("Scanned {} files", reports.len());

    Ok(reports)
}
