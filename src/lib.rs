//! Article-to-dialogue explainer.
//!
//! Turns an article (pasted text, a `.txt` document or a plain-text link)
//! into a short dialogue in which a father explains it to his teenage
//! daughter, rendered as SSML for a speech synthesizer.
//!
//! * [`config`] — TOML settings and platform paths.
//! * [`llm`] — chat-completion gateway and the three model-backed stages.
//! * [`dialogue`] — turns and the two parser strategies.
//! * [`ssml`] — voice-tagged markup.
//! * [`pipeline`] — the orchestrator tying the stages together.
//! * [`source`] / [`synth`] — input acquisition and audio output.

pub mod config;
pub mod dialogue;
pub mod llm;
pub mod pipeline;
pub mod source;
pub mod ssml;
pub mod synth;
