//! Speech-synthesis markup.
//!
//! [`SsmlEmitter`] renders dialogue turns into a `<speak>` document with one
//! `<voice>` block per turn, using the fixed [`VoiceMap`].

pub mod emitter;

pub use emitter::{SsmlEmitter, SsmlError, VoiceMap};
