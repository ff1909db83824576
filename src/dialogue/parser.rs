//! Raw dialogue text → ordered [`Turn`]s.
//!
//! The model is asked for lines shaped like `Отец: ...` / `Дочь: ...`, but
//! nothing enforces that, so both strategies below tolerate arbitrary
//! surrounding text and simply return fewer (or zero) turns.
//!
//! * [`ParseStrategy::Regex`] — scans for `Label:` markers anywhere in the
//!   text and takes everything up to the next marker, across line breaks.
//!   Utterances are returned untouched.  Used for the markup path.
//! * [`ParseStrategy::Lines`] — walks the text line by line, folding
//!   continuation lines into the current turn and prefixing every utterance
//!   with a narration tag (`Отец говорит: `).  Used for transcripts.
//!
//! Both stop at the terminator line (`Key themes:` by default) that the
//! generator appends after the dialogue.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DialogueConfig;
use crate::dialogue::turn::{Speaker, Turn};

// ---------------------------------------------------------------------------
// ParseStrategy
// ---------------------------------------------------------------------------

/// Selects how [`DialogueParser::parse`] reads raw dialogue text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseStrategy {
    /// Label markers anywhere in the text; raw utterances.
    #[default]
    Regex,
    /// Line accumulation; utterances carry a narration tag.
    Lines,
}

impl std::str::FromStr for ParseStrategy {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regex" => Ok(ParseStrategy::Regex),
            "lines" => Ok(ParseStrategy::Lines),
            other => Err(DialogueError::UnknownStrategy(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DialogueError
// ---------------------------------------------------------------------------

/// Errors raised while building a [`DialogueParser`].
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Both label lists were empty, or one role had no usable label.
    #[error("no speaker label configured for {0}")]
    NoLabels(Speaker),

    /// The label alternation did not compile.
    #[error("invalid speaker label pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The end-of-dialogue keyword was blank.
    #[error("dialogue terminator must not be empty")]
    NoTerminator,

    #[error("unknown parse strategy: {0}")]
    UnknownStrategy(String),
}

// ---------------------------------------------------------------------------
// DialogueParser
// ---------------------------------------------------------------------------

/// Parses raw model output into typed turns.
///
/// # Example
/// ```rust
/// use dialogue_explainer::config::DialogueConfig;
/// use dialogue_explainer::dialogue::{DialogueParser, ParseStrategy, Speaker};
///
/// let parser = DialogueParser::new(&DialogueConfig::default()).unwrap();
/// let turns = parser.parse("Отец: Привет\nДочь: Что?", ParseStrategy::Regex);
/// assert_eq!(turns.len(), 2);
/// assert_eq!(turns[1].speaker, Speaker::Daughter);
/// ```
#[derive(Debug, Clone)]
pub struct DialogueParser {
    /// `(label, speaker)` pairs, longest label first.
    labels: Vec<(String, Speaker)>,
    label_re: Regex,
    father_narration: String,
    daughter_narration: String,
    terminator: String,
}

impl DialogueParser {
    /// Build a parser from the configured labels, tags and terminator.
    pub fn new(config: &DialogueConfig) -> Result<Self, DialogueError> {
        let mut labels: Vec<(String, Speaker)> = Vec::new();
        for (list, speaker) in [
            (&config.father_labels, Speaker::Father),
            (&config.daughter_labels, Speaker::Daughter),
        ] {
            let before = labels.len();
            labels.extend(
                list.iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .map(|l| (l.to_string(), speaker)),
            );
            if labels.len() == before {
                return Err(DialogueError::NoLabels(speaker));
            }
        }
        // Longest first so "Daughter" never loses to a shorter prefix label.
        labels.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        let terminator = config.terminator.trim();
        if terminator.is_empty() {
            return Err(DialogueError::NoTerminator);
        }

        // `\b` only where the label starts with a word character; before
        // "(Dad)" it could never match.
        let alternation = labels
            .iter()
            .map(|(l, _)| {
                let starts_word = l.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
                if starts_word {
                    format!(r"\b{}", regex::escape(l))
                } else {
                    regex::escape(l)
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        let label_re = Regex::new(&format!(r"(?P<label>{alternation}):"))?;

        Ok(Self {
            labels,
            label_re,
            father_narration: config.father_narration.clone(),
            daughter_narration: config.daughter_narration.clone(),
            terminator: terminator.to_string(),
        })
    }

    /// Parse `raw` with the given strategy.
    pub fn parse(&self, raw: &str, strategy: ParseStrategy) -> Vec<Turn> {
        let turns = match strategy {
            ParseStrategy::Regex => self.parse_regex(raw),
            ParseStrategy::Lines => self.parse_lines(raw),
        };
        log::debug!("dialogue: {strategy:?} parser extracted {} turns", turns.len());
        turns
    }

    /// Keyword (trimmed) whose line ends the dialogue section.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Narration tag the line strategy puts in front of `speaker`'s lines.
    pub fn narration(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Father => &self.father_narration,
            Speaker::Daughter => &self.daughter_narration,
        }
    }

    // -----------------------------------------------------------------------
    // Regex strategy
    // -----------------------------------------------------------------------

    fn parse_regex(&self, raw: &str) -> Vec<Turn> {
        let body = match self.terminator_offset(raw) {
            Some(at) => &raw[..at],
            None => raw,
        };

        // (marker start, marker end, speaker)
        let marks: Vec<(usize, usize, Speaker)> = self
            .label_re
            .captures_iter(body)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let speaker = self.speaker_for(caps.name("label")?.as_str())?;
                Some((whole.start(), whole.end(), speaker))
            })
            .collect();

        let mut turns = Vec::with_capacity(marks.len());
        for (i, &(_, end, speaker)) in marks.iter().enumerate() {
            let stop = marks.get(i + 1).map_or(body.len(), |next| next.0);
            let utterance = body[end..stop].trim();
            if !utterance.is_empty() {
                turns.push(Turn::new(speaker, utterance));
            }
        }
        turns
    }

    // -----------------------------------------------------------------------
    // Line-accumulation strategy
    // -----------------------------------------------------------------------

    fn parse_lines(&self, raw: &str) -> Vec<Turn> {
        let mut turns = Vec::new();
        let mut current: Option<(Speaker, Vec<&str>)> = None;

        for line in raw.lines() {
            let line = line.trim_matches(|c: char| c.is_whitespace() || is_quote(c));
            if line.is_empty() {
                continue;
            }

            if let Some((speaker, rest)) = self.split_label(line) {
                if let Some((prev, buf)) = current.take() {
                    self.flush(&mut turns, prev, &buf);
                }
                current = Some((speaker, vec![rest.trim()]));
            } else if line.starts_with(self.terminator.as_str()) {
                break;
            } else if let Some((_, buf)) = current.as_mut() {
                buf.push(line);
            }
            // Lines before the first label carry no speaker and are dropped.
        }

        if let Some((speaker, buf)) = current.take() {
            self.flush(&mut turns, speaker, &buf);
        }
        turns
    }

    fn flush(&self, turns: &mut Vec<Turn>, speaker: Speaker, buf: &[&str]) {
        let text = buf.join(" ");
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        turns.push(Turn::new(
            speaker,
            format!("{}{}", self.narration(speaker), text),
        ));
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn speaker_for(&self, label: &str) -> Option<Speaker> {
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, speaker)| *speaker)
    }

    /// `"Отец: текст"` → `(Father, " текст")`.
    fn split_label<'a>(&self, line: &'a str) -> Option<(Speaker, &'a str)> {
        self.labels.iter().find_map(|(label, speaker)| {
            line.strip_prefix(label.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| (*speaker, rest))
        })
    }

    /// Byte offset of the first terminator that opens a line.
    fn terminator_offset(&self, raw: &str) -> Option<usize> {
        raw.match_indices(self.terminator.as_str())
            .map(|(at, _)| at)
            .find(|&at| {
                let line_start = raw[..at].rfind('\n').map_or(0, |nl| nl + 1);
                raw[line_start..at]
                    .chars()
                    .all(|c| c.is_whitespace() || is_quote(c))
            })
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | '«' | '»' | '“' | '”')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
