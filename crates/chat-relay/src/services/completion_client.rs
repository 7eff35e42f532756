use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::models::chat::ConversationTurn;
use crate::utils::error::RelayError;

/// Seam between the relay and the completion API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the full message list, return the first choice's content.
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String, RelayError>;
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ConversationTurn],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Pull `choices[0].message.content` out of a completion response body.
pub fn extract_reply(body: &str) -> Result<String, RelayError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| RelayError::UpstreamParse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RelayError::UpstreamParse("no choices returned".to_string()))
}

/// OpenAI-compatible client for the Groq chat completions endpoint
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    config: UpstreamConfig,
}

impl GroqClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String, RelayError> {
        debug!("Calling {} with {} messages", self.config.model, messages.len());

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!("Failed to read upstream error body (status {}): {}", status, e);
                String::new()
            });
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::UpstreamParse(e.to_string()))?;

        extract_reply(&body)
    }
}
