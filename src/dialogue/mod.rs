//! Dialogue data model and parsing.
//!
//! * [`Turn`] / [`Speaker`] — one utterance of the father or the daughter.
//! * [`DialogueParser`] — turns raw model output into ordered turns using a
//!   named [`ParseStrategy`].

pub mod parser;
pub mod turn;

pub use parser::{DialogueError, DialogueParser, ParseStrategy};
pub use turn::{Speaker, Turn};
