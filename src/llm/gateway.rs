//! Core `ChatGateway` trait and `ApiGateway` implementation.
//!
//! `ApiGateway` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! (OpenAI, proxies in front of it, Ollama in OpenAI mode, vLLM, ...).
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.
//!
//! Every stage of the dialogue pipeline talks to the model through
//! [`ChatGateway`], so tests swap in a scripted double instead of a server.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during a chat completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("LLM service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Messages and options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One entry of the chat-completion `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Per-call sampling options.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    /// `None` leaves the limit to the service.
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

impl CompletionOptions {
    /// Options for free-form generation (themes, dialogue).
    pub fn generation(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: Some(config.max_tokens),
            temperature: config.temperature,
        }
    }

    /// Options for the short True/False coherence classification.
    pub fn classification(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: None,
            temperature: config.classification_temperature,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatGateway trait
// ---------------------------------------------------------------------------

/// Async trait for chat-completion backends.
///
/// Implementors must be `Send + Sync` so one gateway can be shared by every
/// stage and every concurrent request (`Arc<dyn ChatGateway>`).  The only
/// suspension point of a pipeline run is inside [`complete`](Self::complete).
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiGateway
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiGateway {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiGateway {
    /// Build an `ApiGateway` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatGateway for ApiGateway {
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let body = request_body(messages, options);

        let mut req = self.client.post(self.endpoint()).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        log::debug!(
            "llm: POST {} ({} messages, model={})",
            self.endpoint(),
            messages.len(),
            options.model
        );
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        extract_content(&json)
    }
}

/// Build the JSON request body for `/v1/chat/completions`.
fn request_body(messages: &[ChatMessage], options: &CompletionOptions) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model":       options.model,
        "messages":    messages,
        "stream":      false,
        "temperature": options.temperature,
    });
    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    body
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(json: &serde_json::Value) -> Result<String, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(LlmError::EmptyResponse)?
        .trim()
        .to_string();

    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// MockGateway  (test-only)
// ---------------------------------------------------------------------------

/// One call observed by [`MockGateway`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub options: CompletionOptions,
}

#[cfg(test)]
impl RecordedCall {
    pub fn system(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    pub fn user(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// A test double that answers calls from a scripted queue and records every
/// request.  Once the queue is exhausted it returns `EmptyResponse`.
#[cfg(test)]
pub struct MockGateway {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, LlmError>>>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

#[cfg(test)]
impl MockGateway {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Successful replies, answered in order.
    pub fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ChatGateway for MockGateway {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost:11434/".into(),
            api_key: api_key.map(|s| s.to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _gateway = ApiGateway::from_config(&make_config(None));
        let _gateway = ApiGateway::from_config(&make_config(Some("")));
        let _gateway = ApiGateway::from_config(&make_config(Some("sk-test-1234")));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let gateway = ApiGateway::from_config(&make_config(None));
        assert_eq!(
            gateway.endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    /// Verify that `ApiGateway` is object-safe (usable as `dyn ChatGateway`).
    #[test]
    fn gateway_is_object_safe() {
        let gateway: Box<dyn ChatGateway> =
            Box::new(ApiGateway::from_config(&make_config(None)));
        drop(gateway);
    }

    #[test]
    fn request_body_carries_messages_and_options() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let options = CompletionOptions::generation(&LlmConfig::default());
        let body = request_body(&messages, &options);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn classification_body_has_no_token_limit() {
        let options = CompletionOptions::classification(&LlmConfig::default());
        let body = request_body(&[ChatMessage::user("x")], &options);

        assert!(body.get("max_tokens").is_none());
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  True.\n" } }]
        });
        assert_eq!(extract_content(&json).unwrap(), "True.");
    }

    #[test]
    fn extract_content_rejects_missing_or_blank() {
        let missing = serde_json::json!({ "choices": [] });
        assert!(matches!(
            extract_content(&missing),
            Err(LlmError::EmptyResponse)
        ));

        let blank = serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert!(matches!(extract_content(&blank), Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn mock_gateway_replays_and_records() {
        let mock = MockGateway::replying(&["first"]);
        let options = CompletionOptions::generation(&LlmConfig::default());

        let a = mock
            .complete(&[ChatMessage::system("s"), ChatMessage::user("u")], &options)
            .await;
        let b = mock.complete(&[ChatMessage::user("again")], &options).await;

        assert_eq!(a.unwrap(), "first");
        assert!(matches!(b, Err(LlmError::EmptyResponse)));
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls()[0].system(), "s");
        assert_eq!(mock.calls()[1].user(), "again");
    }
}
