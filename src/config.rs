// SPDX-License-Identifier: PMPL-1.0-or-later
//! Check options and config-file loading

use crate::error::{AuditError, Result};
use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-run options supplied by the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub enable_aria_check: bool,
    pub enable_semantic_check: bool,
    pub enable_image_check: bool,
    pub enable_media_check: bool,
    pub enable_visual_check: bool,
    /// Accepted for compatibility; the engine never takes screenshots.
    pub include_screenshots: bool,
    /// Seconds the page source may wait for a page to load.
    pub wait_time: u64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            enable_aria_check: true,
            enable_semantic_check: true,
            enable_image_check: true,
            enable_media_check: true,
            enable_visual_check: true,
            include_screenshots: false,
            wait_time: 5,
        }
    }
}

impl CheckOptions {
    /// Whether the checker for `category` should run
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Aria => self.enable_aria_check,
            Category::Semantic => self.enable_semantic_check,
            Category::Image => self.enable_image_check,
            Category::Media => self.enable_media_check,
            Category::Visual => self.enable_visual_check,
            Category::Keyboard => false,
        }
    }

    /// Enabled categories in report order
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::CHECKED
            .iter()
            .copied()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// Toggle one category on or off
    pub fn set_enabled(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Aria => self.enable_aria_check = enabled,
            Category::Semantic => self.enable_semantic_check = enabled,
            Category::Image => self.enable_image_check = enabled,
            Category::Media => self.enable_media_check = enabled,
            Category::Visual => self.enable_visual_check = enabled,
            Category::Keyboard => {}
        }
    }
}

/// Load options from a TOML or JSON file. A missing file yields defaults.
pub fn load_options(path: &Path) -> Result<CheckOptions> {
    if !path.exists() {
        return Ok(CheckOptions::default());
    }

    let content = std::fs::read_to_string(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        toml::from_str(&content)
            .map_err(|e| AuditError::Config(format!("TOML parse error: {}", e)))
    }
}
