//! OpenAI-compatible generative backend.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Implements `GenerativeBackend` as a single user message, plain-text answer.

use crate::domain::DomainError;
use crate::ports::GenerativeBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.3,
        }
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Extract the first choice's text from a chat completions response body.
fn first_choice(response: ChatResponse) -> Result<String, DomainError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| DomainError::BackendCallFailed("No response choices returned".to_string()))
}

#[async_trait::async_trait]
impl GenerativeBackend for OpenAiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending prompt to OpenAI-compatible API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| DomainError::BackendCallFailed(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::BackendCallFailed(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            DomainError::BackendCallFailed(format!("Failed to parse API response: {}", e))
        })?;

        let text = first_choice(chat_response)?;
        debug!(response_len = text.len(), "received AI response");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_single_user_message() {
        let adapter = OpenAiAdapter::new(
            DEFAULT_OPENAI_URL.to_string(),
            "key".to_string(),
            DEFAULT_OPENAI_MODEL.to_string(),
        );
        let body = serde_json::to_value(adapter.request("hello")).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn first_choice_is_returned() {
        let raw = r#"{"choices":[{"message":{"content":"Russian"}},{"message":{"content":"x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_choice(parsed).unwrap(), "Russian");
    }

    #[test]
    fn no_choices_is_a_call_failure() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice(parsed),
            Err(DomainError::BackendCallFailed(_))
        ));
    }
}
