//! Language-model stages of the dialogue pipeline.
//!
//! This module provides:
//! * [`ChatGateway`] — async trait implemented by all chat-completion backends.
//! * [`ApiGateway`] — OpenAI-compatible REST gateway.
//! * [`CoherenceFilter`] — rejects input that does not read like an article.
//! * [`ThemeExtractor`] / [`ThemeAnnotation`] — key themes for long inputs.
//! * [`DialogueGenerator`] — the father/daughter script itself.
//! * [`prompt`] — fixed prompts for all of the above.
//! * [`LlmError`] — error variants for model calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialogue_explainer::config::AppConfig;
//! use dialogue_explainer::llm::{ApiGateway, ChatGateway, CoherenceFilter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let gateway: Arc<dyn ChatGateway> = Arc::new(ApiGateway::from_config(&config.llm));
//!
//!     let filter = CoherenceFilter::new(gateway, &config.llm);
//!     println!("{}", filter.is_coherent("Центробанк снизил ключевую ставку.").await);
//! }
//! ```

pub mod coherence;
pub mod gateway;
pub mod generator;
pub mod prompt;
pub mod themes;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use coherence::{parse_verdict, CoherenceFilter};
pub use gateway::{ApiGateway, ChatGateway, ChatMessage, CompletionOptions, LlmError, Role};
pub use generator::DialogueGenerator;
pub use themes::{ThemeAnnotation, ThemeExtractor};

#[cfg(test)]
pub use gateway::{MockGateway, RecordedCall};
