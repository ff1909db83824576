//! Coherence filter — gates the pipeline on "is this a real article?".
//!
//! The verdict is deliberately lenient in one direction and strict in the
//! other: any reply containing `true` (case-insensitive) passes, so
//! conversational answers like "Yes, True." work, while every other outcome,
//! including a failed call, blocks the input.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::llm::gateway::{ChatGateway, CompletionOptions};
use crate::llm::prompt::coherence_messages;

/// Asks the model whether a text is a coherent article.
pub struct CoherenceFilter {
    gateway: Arc<dyn ChatGateway>,
    options: CompletionOptions,
}

impl CoherenceFilter {
    pub fn new(gateway: Arc<dyn ChatGateway>, config: &LlmConfig) -> Self {
        Self {
            gateway,
            options: CompletionOptions::classification(config),
        }
    }

    /// `true` only when the model's reply contains "true".
    pub async fn is_coherent(&self, text: &str) -> bool {
        match self
            .gateway
            .complete(&coherence_messages(text), &self.options)
            .await
        {
            Ok(reply) => {
                let verdict = parse_verdict(&reply);
                log::info!("coherence: reply {:?} → {verdict}", reply.trim());
                verdict
            }
            Err(e) => {
                log::error!("coherence: classification failed, rejecting input: {e}");
                false
            }
        }
    }
}

/// Case-insensitive substring match for `"true"` in the trimmed reply.
pub fn parse_verdict(reply: &str) -> bool {
    reply.trim().to_lowercase().contains("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gateway::{LlmError, MockGateway};

    #[test]
    fn verdict_accepts_true_in_any_phrasing() {
        for reply in ["True", "True.", "Yes, true", "TRUE", "  true\n"] {
            assert!(parse_verdict(reply), "{reply:?}");
        }
    }

    #[test]
    fn verdict_rejects_everything_else() {
        for reply in ["False", "false.", "", "Не знаю", "Something went wrong..."] {
            assert!(!parse_verdict(reply), "{reply:?}");
        }
    }

    /// Known tradeoff: an incidental "true" still passes.
    #[test]
    fn verdict_is_a_plain_substring_match() {
        assert!(parse_verdict("It is not entirely true"));
    }

    #[tokio::test]
    async fn gateway_failure_is_not_coherent() {
        let gateway = Arc::new(MockGateway::new(vec![Err(LlmError::Timeout)]));
        let filter = CoherenceFilter::new(gateway.clone(), &LlmConfig::default());

        assert!(!filter.is_coherent("Статья").await);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn uses_classification_options() {
        let gateway = Arc::new(MockGateway::replying(&["True"]));
        let filter = CoherenceFilter::new(gateway.clone(), &LlmConfig::default());

        assert!(filter.is_coherent("Статья").await);

        let call = &gateway.calls()[0];
        assert_eq!(call.options.max_tokens, None);
        assert_eq!(call.options.temperature, 0.1);
        assert!(call.user().contains("Статья"));
    }
}
