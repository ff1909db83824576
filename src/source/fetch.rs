//! Article fetching over HTTP.

use std::time::Duration;

use async_trait::async_trait;

use super::SourceError;

/// Retrieves the article text behind a URL.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;
}

/// Downloads plain-text articles.
///
/// Responses with a `text/plain` content type are returned as-is; anything
/// else (HTML pages in particular) is refused with
/// [`SourceError::UnsupportedContent`].
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        log::info!("source: fetching {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_plain_text(&content_type) {
            return Err(SourceError::UnsupportedContent(content_type));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(text)
    }
}

/// `text/plain`, with or without parameters.
fn is_plain_text(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/plain"))
        .unwrap_or(false)
}
