//! SSML emitter — ordered [`Turn`]s → `<speak>` document.
//!
//! Output shape (one `<voice>` block per turn, in turn order):
//!
//! ```text
//! <speak>
//!   <voice name="artem">
//!     <p>
//!       <s>Привет</s>
//!     </p>
//!   </voice>
//! </speak>
//! ```
//!
//! Voice names are bound per speaker role once, at construction, and never
//! change between turns.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::config::VoiceConfig;
use crate::dialogue::{Speaker, Turn};

// ---------------------------------------------------------------------------
// SsmlError
// ---------------------------------------------------------------------------

/// Errors raised while building or rendering markup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SsmlError {
    /// A voice name is empty or contains characters that would break the
    /// `name="..."` attribute.
    #[error("invalid voice name for {speaker}: {name:?}")]
    InvalidVoice { speaker: Speaker, name: String },

    /// An utterance contains a character XML 1.0 cannot represent.
    #[error("turn {index} contains a character not allowed in XML: U+{code:04X}")]
    InvalidCharacter { index: usize, code: u32 },

    /// The XML writer failed.
    #[error("cannot write markup: {0}")]
    Write(String),
}

// ---------------------------------------------------------------------------
// VoiceMap
// ---------------------------------------------------------------------------

/// Fixed speaker → voice-name binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMap {
    father: String,
    daughter: String,
}

impl VoiceMap {
    pub fn new(father: impl Into<String>, daughter: impl Into<String>) -> Result<Self, SsmlError> {
        let father = father.into();
        let daughter = daughter.into();
        validate_voice(Speaker::Father, &father)?;
        validate_voice(Speaker::Daughter, &daughter)?;
        Ok(Self { father, daughter })
    }

    pub fn from_config(config: &VoiceConfig) -> Result<Self, SsmlError> {
        Self::new(config.father.trim(), config.daughter.trim())
    }

    pub fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Father => &self.father,
            Speaker::Daughter => &self.daughter,
        }
    }
}

fn validate_voice(speaker: Speaker, name: &str) -> Result<(), SsmlError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if ok {
        Ok(())
    } else {
        Err(SsmlError::InvalidVoice {
            speaker,
            name: name.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// SsmlEmitter
// ---------------------------------------------------------------------------

/// Renders dialogue turns as voice-tagged SSML.
///
/// # Example
/// ```rust
/// use dialogue_explainer::dialogue::Turn;
/// use dialogue_explainer::ssml::{SsmlEmitter, VoiceMap};
///
/// let emitter = SsmlEmitter::new(VoiceMap::new("artem", "sveta").unwrap());
/// let ssml = emitter.render(&[Turn::father("Привет")]).unwrap();
/// assert!(ssml.contains(r#"<voice name="artem">"#));
/// ```
#[derive(Debug, Clone)]
pub struct SsmlEmitter {
    voices: VoiceMap,
}

impl SsmlEmitter {
    pub fn new(voices: VoiceMap) -> Self {
        Self { voices }
    }

    /// Render `turns` in order.  An empty slice yields `<speak>\n</speak>`.
    pub fn render(&self, turns: &[Turn]) -> Result<String, SsmlError> {
        for (index, turn) in turns.iter().enumerate() {
            check_xml_chars(&turn.utterance)
                .map_err(|code| SsmlError::InvalidCharacter { index, code })?;
        }

        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        write(&mut writer, Event::Start(BytesStart::new("speak")))?;
        for turn in turns {
            let voice = BytesStart::new("voice")
                .with_attributes([("name", self.voices.voice_for(turn.speaker))]);
            write(&mut writer, Event::Start(voice))?;
            write(&mut writer, Event::Start(BytesStart::new("p")))?;

            write(&mut writer, Event::Start(BytesStart::new("s")))?;
            write(&mut writer, Event::Text(BytesText::new(&turn.utterance)))?;
            write(&mut writer, Event::End(BytesEnd::new("s")))?;

            write(&mut writer, Event::End(BytesEnd::new("p")))?;
            write(&mut writer, Event::End(BytesEnd::new("voice")))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("speak")))?;

        let ssml = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| SsmlError::Write(e.to_string()))?;
        log::debug!("ssml: rendered {} voice blocks", turns.len());
        Ok(ssml)
    }
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), SsmlError> {
    writer
        .write_event(event)
        .map_err(|e| SsmlError::Write(e.to_string()))
}

/// `Err(code point)` for the first character XML 1.0 cannot carry.
fn check_xml_chars(text: &str) -> Result<(), u32> {
    let forbidden = |c: char| match c {
        '\t' | '\n' | '\r' => false,
        '\u{FFFE}' | '\u{FFFF}' => true,
        c => (c as u32) < 0x20,
    };
    match text.chars().find(|&c| forbidden(c)) {
        Some(c) => Err(c as u32),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
