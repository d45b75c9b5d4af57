//! Google Gemini generative backend (REST `generateContent`).

use crate::domain::DomainError;
use crate::ports::GenerativeBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini adapter. One `generateContent` call per prompt, text parts only.
pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g. "https://generativelanguage.googleapis.com/v1beta")
    /// * `api_key` - Google AI Studio API key
    /// * `model` - Model name (e.g. "gemini-2.5-flash")
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(response: GeminiResponse) -> Result<String, DomainError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::BackendCallFailed("Empty response from Gemini".to_string()))?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.is_empty() {
        return Err(DomainError::BackendCallFailed(
            "Gemini candidate has no text".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait::async_trait]
impl GenerativeBackend for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "sending prompt to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GeminiRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| DomainError::BackendCallFailed(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini API returned error");
            return Err(DomainError::BackendCallFailed(format!(
                "Gemini error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            DomainError::BackendCallFailed(format!("Invalid Gemini response: {}", e))
        })?;
        candidate_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_model() {
        let adapter = GeminiAdapter::new(
            format!("{}/", GEMINI_API_URL),
            "k".into(),
            DEFAULT_GEMINI_MODEL.into(),
        );
        assert_eq!(
            adapter.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_wraps_prompt_as_user_text() {
        let body = serde_json::to_value(GeminiRequest::from_prompt("hi")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn text_parts_are_joined() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"I am working!"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(candidate_text(parsed).unwrap(), "Hello, I am working!");
    }

    #[test]
    fn missing_candidates_is_a_call_failure() {
        let parsed: GeminiResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            candidate_text(parsed),
            Err(DomainError::BackendCallFailed(_))
        ));
    }
}
