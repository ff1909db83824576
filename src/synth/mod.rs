//! Speech synthesis boundary.
//!
//! The synthesizer itself is an external service.  This module hands it the
//! SSML produced by the pipeline ([`SpeechSynthesizer`]) and stores the audio
//! it returns under a fresh random file name ([`AudioStore`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SynthConfig;

// ---------------------------------------------------------------------------
// SynthError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("synthesizer request failed: {0}")]
    Request(String),

    #[error("synthesizer request timed out")]
    Timeout,

    #[error("synthesizer returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("synthesizer returned no audio")]
    EmptyAudio,

    #[error("cannot store audio: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SynthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthError::Timeout
        } else {
            SynthError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer
// ---------------------------------------------------------------------------

/// Turns SSML into encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, markup: &str) -> Result<Vec<u8>, SynthError>;
}

/// POSTs SSML (`application/ssml+xml`) to a configured endpoint and returns
/// the response body as audio.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSynthesizer {
    pub fn from_config(config: &SynthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, markup: &str) -> Result<Vec<u8>, SynthError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .body(markup.to_string());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        log::info!("synth: sending {} bytes of SSML to {}", markup.len(), self.endpoint);
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(SynthError::EmptyAudio);
        }
        log::info!("synth: received {} bytes of audio", audio.len());
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// AudioStore
// ---------------------------------------------------------------------------

/// Writes synthesized audio to `<dir>/<uuid>.wav`.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(config.resolved_output_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `audio` under a new random name and return its path.
    pub fn save(&self, audio: &[u8]) -> Result<PathBuf, SynthError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.wav", uuid::Uuid::new_v4()));
        std::fs::write(&path, audio)?;
        log::info!("synth: audio written to {}", path.display());
        Ok(path)
    }
}

/// Synthesize `markup` and store the result.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    store: &AudioStore,
    markup: &str,
) -> Result<PathBuf, SynthError> {
    let audio = synthesizer.synthesize(markup).await?;
    store.save(&audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Returns fixed bytes and remembers the markup it was given.
    struct FixedSynth {
        audio: Vec<u8>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FixedSynth {
        async fn synthesize(&self, markup: &str) -> Result<Vec<u8>, SynthError> {
            self.seen.lock().unwrap().push(markup.to_string());
            if self.audio.is_empty() {
                Err(SynthError::EmptyAudio)
            } else {
                Ok(self.audio.clone())
            }
        }
    }

    #[test]
    fn store_uses_unique_wav_names() {
        let dir = tempdir().expect("temp dir");
        let store = AudioStore::new(dir.path().join("audio"));

        let a = store.save(b"RIFF1").unwrap();
        let b = store.save(b"RIFF2").unwrap();

        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(std::fs::read(&b).unwrap(), b"RIFF2");
    }

    #[tokio::test]
    async fn synthesize_to_file_passes_markup_through() {
        let dir = tempdir().expect("temp dir");
        let store = AudioStore::new(dir.path());
        let synth = FixedSynth {
            audio: b"RIFF".to_vec(),
            seen: Mutex::new(Vec::new()),
        };

        let path = synthesize_to_file(&synth, &store, "<speak>\n</speak>")
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(synth.seen.lock().unwrap().as_slice(), ["<speak>\n</speak>"]);
    }

    #[tokio::test]
    async fn failed_synthesis_writes_nothing() {
        let dir = tempdir().expect("temp dir");
        let store = AudioStore::new(dir.path().join("audio"));
        let synth = FixedSynth {
            audio: Vec::new(),
            seen: Mutex::new(Vec::new()),
        };

        assert!(synthesize_to_file(&synth, &store, "<speak>\n</speak>")
            .await
            .is_err());
        assert!(!store.dir().exists());
    }

    #[test]
    fn empty_api_key_is_ignored() {
        let config = SynthConfig {
            api_key: Some(String::new()),
            ..SynthConfig::default()
        };
        let synth = HttpSynthesizer::from_config(&config);
        assert!(synth.api_key.is_none());
    }
}
