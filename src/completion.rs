//! Chat-completion client
//!
//! Speaks the `OpenAI` chat completions wire format. The remote side
//! enforces no schema on the reply text; callers that expect embedded
//! JSON must locate and parse it defensively (see `prompts`).

use crate::{Error, Result};

/// Abstraction over a chat-completion capability.
///
/// The orchestrator talks to this trait so tests can script replies
/// without a network.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one system+user exchange and return the completion text
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completion client backed by the `OpenAI` API
pub struct ChatCompletion {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ChatCompletion {
    /// Create a new chat-completion client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for chat completion".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ChatCompletion {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature,
        };

        tracing::debug!(model = %self.model, max_tokens, "sending completion request");

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("malformed response: {e}")))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Completion("response contained no choices".to_string()))?;

        tracing::debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}
