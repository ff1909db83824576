//! Theme extractor — summarises the key themes of long inputs.
//!
//! The model is asked for a bracketed list of quoted theme descriptions.
//! The reply is kept verbatim in [`ThemeAnnotation::raw`] and that raw text
//! is what the dialogue prompt receives.  [`ThemeAnnotation::themes`] offers
//! a best-effort parsed list on top of it for logs and display.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::llm::gateway::{ChatGateway, CompletionOptions, LlmError};
use crate::llm::prompt::themes_messages;

// ---------------------------------------------------------------------------
// ThemeAnnotation
// ---------------------------------------------------------------------------

/// The model's theme summary for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeAnnotation {
    raw: String,
}

impl ThemeAnnotation {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The reply exactly as the model produced it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Individual themes.
    ///
    /// Reads the first `[...]` span as a JSON string array; failing that,
    /// falls back to one theme per non-empty line with list markers removed.
    pub fn themes(&self) -> Vec<String> {
        if let (Some(open), Some(close)) = (self.raw.find('['), self.raw.rfind(']')) {
            if open < close {
                if let Ok(list) = serde_json::from_str::<Vec<String>>(&self.raw[open..=close]) {
                    return list
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                }
            }
        }

        self.raw
            .lines()
            .map(strip_list_marker)
            .filter(|l| !l.is_empty() && *l != "[" && *l != "]")
            .map(str::to_string)
            .collect()
    }
}

/// `"1. foo"`, `"- foo"`, `"* foo"` → `"foo"`.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
        {
            return rest.trim();
        }
    }
    line.trim()
}

// ---------------------------------------------------------------------------
// ThemeExtractor
// ---------------------------------------------------------------------------

/// Runs the theme-extraction call for inputs at or above the threshold.
pub struct ThemeExtractor {
    gateway: Arc<dyn ChatGateway>,
    options: CompletionOptions,
    threshold: usize,
}

impl ThemeExtractor {
    pub fn new(gateway: Arc<dyn ChatGateway>, config: &LlmConfig, threshold: usize) -> Self {
        Self {
            gateway,
            options: CompletionOptions::generation(config),
            threshold,
        }
    }

    /// `true` when `text` has at least `threshold` characters.
    pub fn applies_to(&self, text: &str) -> bool {
        text.chars().count() >= self.threshold
    }

    pub async fn extract(&self, text: &str) -> Result<ThemeAnnotation, LlmError> {
        log::info!("themes: extracting key themes");
        let reply = self
            .gateway
            .complete(&themes_messages(text), &self.options)
            .await?;
        let annotation = ThemeAnnotation::new(reply);
        log::info!("themes: extracted {} themes", annotation.themes().len());
        Ok(annotation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gateway::MockGateway;

    #[test]
    fn parses_json_list() {
        let a = ThemeAnnotation::new("[\"Экономика растёт.\", \" Цены падают. \"]");
        assert_eq!(a.themes(), vec!["Экономика растёт.", "Цены падают."]);
    }

    #[test]
    fn parses_list_wrapped_in_prose() {
        let a = ThemeAnnotation::new("Вот темы:\n[\"one\", \"two\"]\nГотово.");
        assert_eq!(a.themes(), vec!["one", "two"]);
    }

    #[test]
    fn falls_back_to_lines() {
        let a = ThemeAnnotation::new("1. Первая тема\n2) Вторая тема\n- Третья\n\n");
        assert_eq!(a.themes(), vec!["Первая тема", "Вторая тема", "Третья"]);
    }

    #[test]
    fn raw_is_kept_verbatim() {
        let raw = "['single', 'quoted']";
        let a = ThemeAnnotation::new(raw);
        assert_eq!(a.raw(), raw);
        assert_eq!(a.themes(), vec!["['single', 'quoted']"]);
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        let gateway = Arc::new(MockGateway::replying(&[]));
        let extractor = ThemeExtractor::new(gateway, &LlmConfig::default(), 5);

        // 4 Cyrillic chars = 8 bytes.
        assert!(!extractor.applies_to("абвг"));
        assert!(extractor.applies_to("абвгд"));
    }

    #[tokio::test]
    async fn extract_returns_raw_reply() {
        let gateway = Arc::new(MockGateway::replying(&["[\"a\"]"]));
        let extractor = ThemeExtractor::new(gateway.clone(), &LlmConfig::default(), 100);

        let annotation = extractor.extract("text").await.unwrap();
        assert_eq!(annotation.raw(), "[\"a\"]");
        assert_eq!(gateway.calls()[0].options.max_tokens, Some(1500));
    }

    #[tokio::test]
    async fn extract_propagates_gateway_error() {
        let gateway = Arc::new(MockGateway::new(vec![Err(LlmError::Timeout)]));
        let extractor = ThemeExtractor::new(gateway, &LlmConfig::default(), 100);

        assert!(matches!(
            extractor.extract("text").await,
            Err(LlmError::Timeout)
        ));
    }
}
