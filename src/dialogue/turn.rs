//! Typed dialogue turns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two roles in every generated dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Father,
    Daughter,
}

impl Speaker {
    /// Lower-case identifier used in transcripts and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Father => "father",
            Speaker::Daughter => "daughter",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One speaker's utterance, in conversational order.
///
/// Turns are produced by [`DialogueParser`](crate::dialogue::DialogueParser)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub utterance: String,
}

impl Turn {
    pub fn new(speaker: Speaker, utterance: impl Into<String>) -> Self {
        Self {
            speaker,
            utterance: utterance.into(),
        }
    }

    pub fn father(utterance: impl Into<String>) -> Self {
        Self::new(Speaker::Father, utterance)
    }

    pub fn daughter(utterance: impl Into<String>) -> Self {
        Self::new(Speaker::Daughter, utterance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_speaker() {
        assert_eq!(Turn::father("a").speaker, Speaker::Father);
        assert_eq!(Turn::daughter("b").speaker, Speaker::Daughter);
        assert_eq!(Turn::daughter("b").utterance, "b");
    }

    #[test]
    fn turn_serialises_with_speaker_tag() {
        let json = serde_json::to_value(Turn::father("Привет")).unwrap();
        assert_eq!(json["speaker"], "Father");
        assert_eq!(json["utterance"], "Привет");
    }

    #[test]
    fn speaker_display_is_lower_case() {
        assert_eq!(Speaker::Father.to_string(), "father");
        assert_eq!(Speaker::Daughter.to_string(), "daughter");
    }
}
