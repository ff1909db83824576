//! Dialogue generator — asks the model for the father/daughter script.
//!
//! The reply's shape is not checked here; the parser decides later whether
//! it contains any usable turns.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::llm::gateway::{ChatGateway, CompletionOptions, LlmError};
use crate::llm::prompt::dialogue_messages;
use crate::llm::themes::ThemeAnnotation;

pub struct DialogueGenerator {
    gateway: Arc<dyn ChatGateway>,
    options: CompletionOptions,
    /// Opens the trailing themes section; must match the parser's terminator.
    themes_header: String,
}

impl DialogueGenerator {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        config: &LlmConfig,
        themes_header: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            options: CompletionOptions::generation(config),
            themes_header: themes_header.into(),
        }
    }

    /// Generate the raw dialogue for `text`.
    ///
    /// With `themes`, the raw annotation is appended to the request and
    /// echoed after the reply as a trailing section opened by the themes
    /// header: `"<dialogue>\n\n<header> <annotation>"`.
    pub async fn generate(
        &self,
        text: &str,
        themes: Option<&ThemeAnnotation>,
    ) -> Result<String, LlmError> {
        log::info!("generator: requesting dialogue");
        let annotation = themes.map(ThemeAnnotation::raw);
        let mut dialogue = self
            .gateway
            .complete(&dialogue_messages(text, annotation), &self.options)
            .await?;

        if let Some(annotation) = annotation {
            dialogue.push_str("\n\n");
            dialogue.push_str(&self.themes_header);
            dialogue.push(' ');
            dialogue.push_str(annotation);
        }

        log::info!("generator: dialogue received ({} chars)", dialogue.chars().count());
        Ok(dialogue)
    }
}
