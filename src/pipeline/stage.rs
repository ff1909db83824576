//! Pipeline stages.
//!
//! [`PipelineStage`] names each step of a run so logs and errors can say
//! where a request stopped.
//!
//! ```text
//! Coherence ──ok──▶ Themes (only for long inputs)
//!           ──ok──▶ Generation
//!                   ──ok──▶ Parsing
//!                           ──ok──▶ Rendering ──▶ DialogueOutput
//! any stage ──error──▶ PipelineError (no later stage runs)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Coherence classification of the input.
    Coherence,
    /// Theme extraction (long inputs only).
    Themes,
    /// Dialogue generation.
    Generation,
    /// Raw dialogue → turns.
    Parsing,
    /// Turns → SSML.
    Rendering,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ORDER: [PipelineStage; 5] = [
        PipelineStage::Coherence,
        PipelineStage::Themes,
        PipelineStage::Generation,
        PipelineStage::Parsing,
        PipelineStage::Rendering,
    ];

    /// Returns `true` for stages that call the language model.
    ///
    /// ```
    /// use dialogue_explainer::pipeline::PipelineStage;
    ///
    /// assert!(PipelineStage::Coherence.calls_model());
    /// assert!(PipelineStage::Themes.calls_model());
    /// assert!(PipelineStage::Generation.calls_model());
    /// assert!(!PipelineStage::Parsing.calls_model());
    /// assert!(!PipelineStage::Rendering.calls_model());
    /// ```
    pub fn calls_model(&self) -> bool {
        matches!(
            self,
            PipelineStage::Coherence | PipelineStage::Themes | PipelineStage::Generation
        )
    }

    /// A short human-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Coherence => "coherence check",
            PipelineStage::Themes => "theme extraction",
            PipelineStage::Generation => "dialogue generation",
            PipelineStage::Parsing => "dialogue parsing",
            PipelineStage::Rendering => "markup rendering",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = PipelineStage::ORDER.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), PipelineStage::ORDER.len());
    }

    #[test]
    fn model_stages_come_first() {
        let first_local = PipelineStage::ORDER
            .iter()
            .position(|s| !s.calls_model())
            .unwrap();
        assert!(PipelineStage::ORDER[first_local..]
            .iter()
            .all(|s| !s.calls_model()));
    }
}
