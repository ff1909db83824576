//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a hand-written `settings.toml`
//! only needs the keys it wants to change.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::dialogue::ParseStrategy;

/// Environment variable consulted when `llm.api_key` is not set in the file.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the chat-completion gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API; `/v1/chat/completions` is
    /// appended per request.
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature for theme extraction and dialogue generation.
    pub temperature: f32,
    /// Sampling temperature for the coherence classification.
    pub classification_temperature: f32,
    /// Token limit for theme extraction and dialogue generation.
    pub max_tokens: u32,
    /// Maximum seconds to wait for one completion before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.proxyapi.ru/openai".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            classification_temperature: 0.1,
            max_tokens: 1500,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Settings for stage sequencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inputs with at least this many characters get a theme-extraction pass.
    pub theme_threshold: usize,
    /// Parser used to turn the raw dialogue into the turns that are rendered
    /// as markup.
    pub markup_strategy: ParseStrategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            theme_threshold: 100,
            markup_strategy: ParseStrategy::Regex,
        }
    }
}

// ---------------------------------------------------------------------------
// DialogueConfig
// ---------------------------------------------------------------------------

/// Speaker labels and tags recognised in the model's raw dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Labels that introduce a father line (without the trailing colon).
    /// A label starting with a letter or digit only matches at a word
    /// boundary, so `Father` does not fire inside `StepFather:`.
    pub father_labels: Vec<String>,
    /// Labels that introduce a daughter line (without the trailing colon).
    pub daughter_labels: Vec<String>,
    /// Prefix added to father utterances by the line-accumulation parser.
    pub father_narration: String,
    /// Prefix added to daughter utterances by the line-accumulation parser.
    pub daughter_narration: String,
    /// A line starting with this keyword ends the dialogue section.  The
    /// generator opens its appended themes section with the same keyword.
    /// Must not be blank.
    pub terminator: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            father_labels: vec!["Отец".into(), "Father".into()],
            daughter_labels: vec!["Дочь".into(), "Daughter".into()],
            father_narration: "Отец говорит: ".into(),
            daughter_narration: "Дочь спрашивает: ".into(),
            terminator: "Key themes:".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Synthesizer voice names, fixed per speaker role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub father: String,
    pub daughter: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            father: "artem".into(),
            daughter: "sveta".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SynthConfig
// ---------------------------------------------------------------------------

/// Settings for the external speech synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Endpoint that accepts SSML in the request body and answers with audio.
    pub endpoint: String,
    /// Bearer token for the synthesizer, if it needs one.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for synthesis.
    pub timeout_secs: u64,
    /// Where `.wav` files are written — `None` means [`AppPaths::audio_dir`].
    pub output_dir: Option<PathBuf>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/synthesize".into(),
            api_key: None,
            timeout_secs: 120,
            output_dir: None,
        }
    }
}

impl SynthConfig {
    /// The configured output directory, or the platform default.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().audio_dir)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// Constructed once at startup and handed to every component by reference;
/// nothing reads configuration from globals.
///
/// ```rust,no_run
/// use dialogue_explainer::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat-completion gateway settings.
    pub llm: LlmConfig,
    /// Stage sequencing settings.
    pub pipeline: PipelineConfig,
    /// Dialogue labels, narration tags and terminator.
    pub dialogue: DialogueConfig,
    /// Voice names used in the markup.
    pub voices: VoiceConfig,
    /// Speech synthesizer settings.
    pub synth: SynthConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet,
    /// then fills the API key from [`API_KEY_ENV`] when it is unset.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.fill_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Use `key` as the LLM API key unless one is already configured.
    pub fn fill_api_key(&mut self, key: Option<String>) {
        let missing = self.llm.api_key.as_deref().map_or(true, str::is_empty);
        if missing {
            if let Some(key) = key.filter(|k| !k.is_empty()) {
                self.llm.api_key = Some(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.max_tokens, loaded.llm.max_tokens);
        assert_eq!(original.llm.temperature, loaded.llm.temperature);
        assert_eq!(
            original.pipeline.theme_threshold,
            loaded.pipeline.theme_threshold
        );
        assert_eq!(
            original.pipeline.markup_strategy,
            loaded.pipeline.markup_strategy
        );
        assert_eq!(original.dialogue.father_labels, loaded.dialogue.father_labels);
        assert_eq!(original.dialogue.terminator, loaded.dialogue.terminator);
        assert_eq!(original.voices.father, loaded.voices.father);
        assert_eq!(original.voices.daughter, loaded.voices.daughter);
        assert_eq!(original.synth.endpoint, loaded.synth.endpoint);
    }

    /// `load_from` on a non-existent path must return defaults without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.llm.model, default.llm.model);
        assert_eq!(config.voices.father, default.voices.father);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.max_tokens, 1500);
        assert_eq!(cfg.llm.temperature, 0.7);
        assert_eq!(cfg.llm.classification_temperature, 0.1);
        assert_eq!(cfg.pipeline.theme_threshold, 100);
        assert_eq!(cfg.pipeline.markup_strategy, ParseStrategy::Regex);
        assert_eq!(cfg.voices.father, "artem");
        assert_eq!(cfg.voices.daughter, "sveta");
        assert_eq!(cfg.dialogue.terminator, "Key themes:");
        assert!(cfg.synth.output_dir.is_none());
    }

    /// A partial file only overrides the keys it names.
    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[voices]\nfather = \"filipp\"\n\n[pipeline]\nmarkup_strategy = \"Lines\"\n",
        )
        .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.voices.father, "filipp");
        assert_eq!(cfg.voices.daughter, "sveta");
        assert_eq!(cfg.pipeline.markup_strategy, ParseStrategy::Lines);
        assert_eq!(cfg.pipeline.theme_threshold, 100);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn fill_api_key_only_when_missing() {
        let mut cfg = AppConfig::default();
        cfg.fill_api_key(Some("sk-env".into()));
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-env"));

        cfg.fill_api_key(Some("sk-other".into()));
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-env"));

        let mut empty = AppConfig::default();
        empty.llm.api_key = Some(String::new());
        empty.fill_api_key(Some("sk-env".into()));
        assert_eq!(empty.llm.api_key.as_deref(), Some("sk-env"));

        let mut none = AppConfig::default();
        none.fill_api_key(Some(String::new()));
        assert!(none.llm.api_key.is_none());
    }

    #[test]
    fn explicit_output_dir_wins() {
        let mut synth = SynthConfig::default();
        synth.output_dir = Some(PathBuf::from("/tmp/out"));
        assert_eq!(synth.resolved_output_dir(), PathBuf::from("/tmp/out"));
    }
}
