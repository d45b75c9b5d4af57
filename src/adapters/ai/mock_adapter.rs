//! Mock generative backend for development and testing without API calls.
//!
//! Replies are scripted (consumed in order) or synthesized; every prompt is recorded.

use crate::domain::DomainError;
use crate::ports::GenerativeBackend;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Mock backend.
///
/// Returns predetermined responses without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockBackend {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    fail: bool,
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a new mock backend with no delay.
    pub fn new() -> Self {
        Self::with_delay(0)
    }

    /// Create a mock backend with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            fail: false,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose every call fails with [`DomainError::BackendCallFailed`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Backend answering with `replies` in order, then with synthesized text.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::new()
        }
    }

    /// Every prompt received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        info!(prompt_len = prompt.len(), "[MOCK] simulating generation");
        self.prompts.lock().await.push(prompt.to_string());

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if self.fail {
            return Err(DomainError::BackendCallFailed(
                "[MOCK] simulated backend failure".to_string(),
            ));
        }

        if let Some(reply) = self.replies.lock().await.pop_front() {
            return Ok(reply);
        }

        Ok(format!(
            "[MOCK] Generated response for a prompt of {} lines. Configure a real \
             backend API key to get actual reports.",
            prompt.lines().count()
        ))
    }
}
