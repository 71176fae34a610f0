// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page sources: where HTML snapshots come from.
//!
//! The engine only ever sees a [`PageSnapshot`]. Rendering a page in a real
//! browser is outside this crate; a local file, a plain HTTP GET or an
//! in-memory string are supported.

use crate::config::CheckOptions;
use crate::document::Document;
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("a11yscore/", env!("CARGO_PKG_VERSION"));

const UNKNOWN: &str = "unknown";

/// Browser viewport dimensions, when the source knows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// Facts about the fetched page that are not findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_size: Option<ViewportSize>,
    pub has_script: bool,
    pub language: String,
    pub charset: String,
}

impl PageMetadata {
    /// Derive metadata from the markup itself
    pub fn from_document(document: &Document, url: &str) -> Self {
        let title = document
            .find("title")
            .map(|t| t.stripped_text())
            .unwrap_or_default();

        let language = document
            .root_element()
            .and_then(|html| html.non_empty_attr("lang"))
            .map(|lang| lang.trim().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let charset = document
            .by_tag("meta")
            .into_iter()
            .find_map(|meta| {
                meta.non_empty_attr("charset")
                    .map(|c| c.trim().to_string())
                    .or_else(|| meta.attr("content").and_then(charset_from_content_type))
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            title,
            url: url.to_string(),
            viewport_size: None,
            has_script: document.find("script").is_some(),
            language,
            charset,
        }
    }

    /// Like [`PageMetadata::from_document`], but tolerant of markup that
    /// cannot be parsed at all
    pub fn from_html(html: &str, url: &str) -> Self {
        match Document::parse(html) {
            Ok(document) => Self::from_document(&document, url),
            Err(e) => {
                debug!(url, error = %e, "metadata unavailable");
                Self::unknown(url)
            }
        }
    }

    fn unknown(url: &str) -> Self {
        Self {
            title: String::new(),
            url: url.to_string(),
            viewport_size: None,
            has_script: false,
            language: UNKNOWN.to_string(),
            charset: UNKNOWN.to_string(),
        }
    }
}

/// `text/html; charset=utf-8` -> `utf-8`
fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let (key, val) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| val.trim().trim_matches('"').to_string())
    })
}

/// HTML plus metadata for one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub html: String,
    pub metadata: PageMetadata,
}

/// Fetches page snapshots
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `target` and return its HTML snapshot
    async fn fetch(&self, target: &str, options: &CheckOptions) -> Result<PageSnapshot>;
}

/// Reads snapshots from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FilePageSource {
    root: Option<PathBuf>,
}

impl FilePageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative targets against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, target: &str) -> PathBuf {
        let path = PathBuf::from(target.strip_prefix("file://").unwrap_or(target));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch(&self, target: &str, _options: &CheckOptions) -> Result<PageSnapshot> {
        let path = self.resolve(target);
        debug!(path = %path.display(), "reading page");
        let html = tokio::fs::read_to_string(&path).await?;
        let metadata = PageMetadata::from_html(&html, target);
        Ok(PageSnapshot { html, metadata })
    }
}

/// Fetches pages with a plain HTTP GET; scripts are not executed
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, target: &str, options: &CheckOptions) -> Result<PageSnapshot> {
        info!(url = target, timeout = options.wait_time, "fetching page");

        let response = self
            .client
            .get(target)
            .timeout(Duration::from_secs(options.wait_time))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::HttpStatus {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let header_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let html = response.text().await?;
        let mut metadata = PageMetadata::from_html(&html, &final_url);
        if let Some(charset) = header_charset {
            if metadata.charset == UNKNOWN {
                metadata.charset = charset;
            }
        }

        debug!(url = %final_url, bytes = html.len(), "page fetched");
        Ok(PageSnapshot { html, metadata })
    }
}

/// Serves one fixed snapshot for every target
#[derive(Debug, Clone)]
pub struct StaticPageSource {
    snapshot: PageSnapshot,
}

impl StaticPageSource {
    /// Snapshot with metadata derived from `html`
    pub fn new(html: impl Into<String>, url: &str) -> Self {
        let html = html.into();
        let metadata = PageMetadata::from_html(&html, url);
        Self {
            snapshot: PageSnapshot { html, metadata },
        }
    }

    pub fn with_metadata(html: impl Into<String>, metadata: PageMetadata) -> Self {
        Self {
            snapshot: PageSnapshot {
                html: html.into(),
                metadata,
            },
        }
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch(&self, _target: &str, _options: &CheckOptions) -> Result<PageSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Whether `target` should be fetched over HTTP
pub fn is_remote(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_document() {
        let doc = Document::parse(
            r#"<html lang="ko"><head><meta charset="UTF-8"><title> Home </title>
               <script src="app.js"></script></head><body></body></html>"#,
        )
        .unwrap();
        let meta = PageMetadata::from_document(&doc, "https://example.com/");
        assert_eq!(meta.title, "Home");
        assert_eq!(meta.language, "ko");
        assert_eq!(meta.charset, "UTF-8");
        assert!(meta.has_script);
        assert_eq!(meta.viewport_size, None);
    }

    #[test]
    fn test_metadata_http_equiv_charset() {
        let doc = Document::parse(
            r#"<meta http-equiv="Content-Type" content="text/html; charset=euc-kr"><p>x</p>"#,
        )
        .unwrap();
        let meta = PageMetadata::from_document(&doc, "page.html");
        assert_eq!(meta.charset, "euc-kr");
        assert_eq!(meta.language, "unknown");
        assert!(!meta.has_script);
    }

    #[test]
    fn test_metadata_from_empty_html() {
        let meta = PageMetadata::from_html("  ", "empty.html");
        assert_eq!(meta.title, "");
        assert_eq!(meta.charset, "unknown");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("site/index.html"));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticPageSource::new("<title>Static</title>", "memory://page");
        let snapshot = source
            .fetch("ignored", &CheckOptions::default())
            .await
            .unwrap();
        assert_eq!(snapshot.metadata.title, "Static");
        assert_eq!(snapshot.metadata.url, "memory://page");
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<title>Local</title>").unwrap();

        let source = FilePageSource::with_root(dir.path());
        let snapshot = source
            .fetch("index.html", &CheckOptions::default())
            .await
            .unwrap();
        assert_eq!(snapshot.metadata.title, "Local");

        let missing = source.fetch("missing.html", &CheckOptions::default()).await;
        assert!(matches!(missing, Err(AuditError::Io(_))));
    }
}
