// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for a11yscore

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document is empty, nothing to analyze")]
    EmptyDocument,

    #[error("Document is {size} bytes, above the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },
}
