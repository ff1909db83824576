//! Pipeline orchestrator module.
//!
//! This module wires the text → dialogue → markup pipeline.
//!
//! # Architecture
//!
//! ```text
//! input text
//!        │
//!        ▼
//! DialoguePipeline::run()  ← async, one call per request
//!        │
//!        ├─ CoherenceFilter     (model call)
//!        ├─ ThemeExtractor      (model call, long inputs only)
//!        ├─ DialogueGenerator   (model call)
//!        ├─ DialogueParser      (markup strategy + Lines transcript)
//!        └─ SsmlEmitter
//!              │
//!              ▼
//!        DialogueOutput { turns, markup, raw_dialogue, transcript, themes }
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialogue_explainer::config::AppConfig;
//! use dialogue_explainer::llm::{ApiGateway, ChatGateway};
//! use dialogue_explainer::pipeline::DialoguePipeline;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load().unwrap_or_default();
//!     let gateway: Arc<dyn ChatGateway> = Arc::new(ApiGateway::from_config(&config.llm));
//!     let pipeline = Arc::new(DialoguePipeline::new(gateway, &config).unwrap());
//!
//!     let task = {
//!         let pipeline = Arc::clone(&pipeline);
//!         tokio::spawn(async move { pipeline.run("Текст статьи...").await })
//!     };
//!     let _ = task.await;
//! }
//! ```

pub mod runner;
pub mod stage;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{
    DialogueOutput, DialoguePipeline, PipelineError, SetupError, USER_ERROR_MESSAGE,
};
pub use stage::PipelineStage;
