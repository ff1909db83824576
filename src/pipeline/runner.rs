//! Pipeline orchestrator — drives coherence → themes → dialogue → turns → SSML.
//!
//! [`DialoguePipeline`] owns one instance of every stage and runs them
//! strictly in sequence for each request.
//!
//! # Pipeline flow
//!
//! ```text
//! run(text)
//!   └─▶ CoherenceFilter::is_coherent            false → Incoherent
//!         └─▶ [len ≥ threshold] ThemeExtractor  Err   → Gateway { Themes }
//!               └─▶ DialogueGenerator           Err   → Gateway { Generation }
//!                     └─▶ DialogueParser        []    → EmptyDialogue
//!                           └─▶ SsmlEmitter     Err   → Markup
//!                                 └─▶ DialogueOutput
//! ```
//!
//! Each stage is attempted exactly once; the first failure ends the run and
//! no partial output is returned.  Model calls are the only `.await` points.
//! The pipeline holds no mutable state, so one instance can serve any number
//! of concurrent requests behind an `Arc`.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::dialogue::{DialogueError, DialogueParser, ParseStrategy, Turn};
use crate::llm::{
    ChatGateway, CoherenceFilter, DialogueGenerator, LlmError, ThemeAnnotation, ThemeExtractor,
};
use crate::ssml::{SsmlEmitter, SsmlError, VoiceMap};

use super::stage::PipelineStage;

/// The single message shown to users whatever went wrong.
pub const USER_ERROR_MESSAGE: &str = "Something went wrong...";

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Why a run stopped.
///
/// The variants are for logs and tests; anything user-facing should go
/// through [`PipelineError::user_message`], which is the same for all of them.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The coherence filter rejected the input (or could not classify it).
    #[error("input rejected by the coherence filter")]
    Incoherent,

    /// A model call failed.
    #[error("{stage} failed: {source}")]
    Gateway {
        stage: PipelineStage,
        #[source]
        source: LlmError,
    },

    /// The generated text contained no recognisable turns.
    #[error("model reply contained no dialogue turns")]
    EmptyDialogue,

    /// The turns could not be rendered as markup.
    #[error("markup rendering failed: {0}")]
    Markup(#[from] SsmlError),
}

impl PipelineError {
    /// Stage at which the run stopped.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Incoherent => PipelineStage::Coherence,
            PipelineError::Gateway { stage, .. } => *stage,
            PipelineError::EmptyDialogue => PipelineStage::Parsing,
            PipelineError::Markup(_) => PipelineStage::Rendering,
        }
    }

    /// Undifferentiated user-facing message.
    pub fn user_message(&self) -> &'static str {
        USER_ERROR_MESSAGE
    }
}

/// Errors raised while assembling a [`DialoguePipeline`] from config.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("dialogue parser: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("voices: {0}")]
    Voices(#[from] SsmlError),
}

// ---------------------------------------------------------------------------
// DialogueOutput
// ---------------------------------------------------------------------------

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOutput {
    /// Turns rendered into `markup`, in conversational order.
    pub turns: Vec<Turn>,
    /// The `<speak>` document for the synthesizer.
    pub markup: String,
    /// The generator's text before parsing, including any trailing
    /// `Key themes:` section.
    pub raw_dialogue: String,
    /// Display transcript: `raw_dialogue` parsed with narration tags.
    pub transcript: Vec<Turn>,
    /// Themes extracted for long inputs.
    pub themes: Option<ThemeAnnotation>,
}

// ---------------------------------------------------------------------------
// DialoguePipeline
// ---------------------------------------------------------------------------

/// Runs the full text → dialogue → markup pipeline.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use dialogue_explainer::config::AppConfig;
/// use dialogue_explainer::llm::{ApiGateway, ChatGateway};
/// use dialogue_explainer::pipeline::DialoguePipeline;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let gateway: Arc<dyn ChatGateway> = Arc::new(ApiGateway::from_config(&config.llm));
/// let pipeline = DialoguePipeline::new(gateway, &config).unwrap();
///
/// match pipeline.run("Центробанк снизил ключевую ставку...").await {
///     Ok(output) => println!("{}", output.markup),
///     Err(e) => eprintln!("{}", e.user_message()),
/// }
/// # }
/// ```
pub struct DialoguePipeline {
    coherence: CoherenceFilter,
    themes: ThemeExtractor,
    generator: DialogueGenerator,
    parser: DialogueParser,
    emitter: SsmlEmitter,
    markup_strategy: ParseStrategy,
}

// Compile-time assertion: one pipeline can be shared across tasks.
const _: fn() = || {
    fn _assert_send_sync<T: Send + Sync>() {}
    _assert_send_sync::<DialoguePipeline>();
};

impl DialoguePipeline {
    /// Build every stage from `config`, all sharing `gateway`.
    pub fn new(gateway: Arc<dyn ChatGateway>, config: &AppConfig) -> Result<Self, SetupError> {
        let parser = DialogueParser::new(&config.dialogue)?;
        // The generator's themes section must open with the keyword the
        // parser stops at, or it would be read as part of the last turn.
        let generator = DialogueGenerator::new(gateway.clone(), &config.llm, parser.terminator());

        Ok(Self {
            coherence: CoherenceFilter::new(Arc::clone(&gateway), &config.llm),
            themes: ThemeExtractor::new(gateway, &config.llm, config.pipeline.theme_threshold),
            generator,
            parser,
            emitter: SsmlEmitter::new(VoiceMap::from_config(&config.voices)?),
            markup_strategy: config.pipeline.markup_strategy,
        })
    }

    /// Override the parser used for the markup path.
    pub fn with_markup_strategy(mut self, strategy: ParseStrategy) -> Self {
        self.markup_strategy = strategy;
        self
    }

    // -----------------------------------------------------------------------
    // Main entry point
    // -----------------------------------------------------------------------

    /// Run every stage for `text`, stopping at the first failure.
    pub async fn run(&self, text: &str) -> Result<DialogueOutput, PipelineError> {
        let result = self.run_stages(text).await;
        match &result {
            Ok(output) => log::info!(
                "pipeline: completed with {} turns ({} bytes of markup)",
                output.turns.len(),
                output.markup.len()
            ),
            Err(e) => log::error!("pipeline: stopped at {}: {e}", e.stage()),
        }
        result
    }

    async fn run_stages(&self, text: &str) -> Result<DialogueOutput, PipelineError> {
        log::info!(
            "pipeline: processing input ({} chars)",
            text.chars().count()
        );

        // ── 1. Coherence gate ────────────────────────────────────────────
        if !self.coherence.is_coherent(text).await {
            log::warn!("pipeline: text coherence check failed");
            return Err(PipelineError::Incoherent);
        }

        // ── 2. Themes (long inputs only) ─────────────────────────────────
        let themes = if self.themes.applies_to(text) {
            let annotation =
                self.themes
                    .extract(text)
                    .await
                    .map_err(|source| PipelineError::Gateway {
                        stage: PipelineStage::Themes,
                        source,
                    })?;
            Some(annotation)
        } else {
            log::debug!("pipeline: input below theme threshold, skipping themes");
            None
        };

        // ── 3. Dialogue generation ───────────────────────────────────────
        let raw_dialogue = self
            .generator
            .generate(text, themes.as_ref())
            .await
            .map_err(|source| PipelineError::Gateway {
                stage: PipelineStage::Generation,
                source,
            })?;

        // ── 4. Parsing ───────────────────────────────────────────────────
        let turns = self.parser.parse(&raw_dialogue, self.markup_strategy);
        if turns.is_empty() {
            log::warn!("pipeline: no dialogue extracted from model reply");
            return Err(PipelineError::EmptyDialogue);
        }

        // ── 5. Markup ────────────────────────────────────────────────────
        let markup = self.emitter.render(&turns)?;

        let transcript = self.parser.parse(&raw_dialogue, ParseStrategy::Lines);

        Ok(DialogueOutput {
            turns,
            markup,
            raw_dialogue,
            transcript,
            themes,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
