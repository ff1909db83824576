//! Input sources — where the article text comes from.
//!
//! * [`InputSource::detect`] — decides whether a chat message is a link or
//!   literal article text.
//! * [`decode_file`] — reads an uploaded document.
//! * [`ArticleFetcher`] / [`HttpArticleFetcher`] — downloads article text.
//!
//! Site-specific HTML scraping is out of scope: the fetcher accepts only
//! plain-text responses.

pub mod fetch;
pub mod file;

pub use fetch::{ArticleFetcher, HttpArticleFetcher};
pub use file::decode_file;

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Errors raised while obtaining article text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Only `.txt` documents are decoded.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("file is not valid UTF-8 text: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("server returned status {0}")]
    Status(u16),

    /// The URL served something other than plain text.
    #[error("unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("source contained no text")]
    Empty,
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// InputSource
// ---------------------------------------------------------------------------

/// What a user message refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// The message itself is the article.
    Text(String),
    /// The message is a link to the article.
    Url(String),
}

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^https?://(?:[a-zA-Z0-9]|[$-_@.&+]|[!*\(\),]|%[0-9a-fA-F]{2})+")
            .expect("URL pattern is valid")
    })
}

impl InputSource {
    /// A message starting with `http://` or `https://` followed by URL
    /// characters is a link; anything else is literal text.
    pub fn detect(message: &str) -> Self {
        let trimmed = message.trim();
        if url_pattern().is_match(trimmed) {
            InputSource::Url(trimmed.to_string())
        } else {
            InputSource::Text(message.to_string())
        }
    }
}
