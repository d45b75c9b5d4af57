//! Dominant-language heuristic backed by the generative backend.
//!
//! One attempt, no confidence score, a single language name. Any failure yields
//! [`FALLBACK_LANGUAGE`].

use crate::domain::FALLBACK_LANGUAGE;
use crate::domain::prompts::language_detection_prompt;
use crate::ports::GenerativeBackend;
use std::sync::Arc;
use tracing::{info, warn};

/// Sample cap used by the daily report flow.
pub const REPORT_SAMPLE_LIMIT: usize = 50;

pub struct LanguageClassifier {
    backend: Option<Arc<dyn GenerativeBackend>>,
}

impl LanguageClassifier {
    pub fn new(backend: Option<Arc<dyn GenerativeBackend>>) -> Self {
        Self { backend }
    }

    /// Name of the dominant language of the first `limit` texts, in English nomenclature.
    pub async fn detect(&self, sample: &[&str], limit: usize) -> String {
        let Some(backend) = &self.backend else {
            warn!("generative backend not initialized, assuming {}", FALLBACK_LANGUAGE);
            return FALLBACK_LANGUAGE.to_string();
        };

        let blob = sample
            .iter()
            .take(limit)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        match backend.generate(&language_detection_prompt(&blob)).await {
            Ok(answer) => {
                let language = answer.trim();
                if language.is_empty() {
                    warn!("empty language detection answer, using fallback");
                    return FALLBACK_LANGUAGE.to_string();
                }
                info!(language, "detected primary language");
                language.to_string()
            }
            Err(e) => {
                warn!(error = %e, "language detection failed, using fallback");
                FALLBACK_LANGUAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockBackend;

    #[tokio::test]
    async fn backend_failure_falls_back_to_english() {
        let classifier = LanguageClassifier::new(Some(Arc::new(MockBackend::failing())));
        assert_eq!(classifier.detect(&["hola", "que tal"], 50).await, "English");
    }

    #[tokio::test]
    async fn missing_backend_falls_back_to_english() {
        let classifier = LanguageClassifier::new(None);
        assert_eq!(classifier.detect(&["привет"], 50).await, "English");
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let backend = Arc::new(MockBackend::with_replies(["  Russian \n"]));
        let classifier = LanguageClassifier::new(Some(backend));
        assert_eq!(classifier.detect(&["привет"], 50).await, "Russian");
    }

    #[tokio::test]
    async fn blank_answer_falls_back() {
        let backend = Arc::new(MockBackend::with_replies(["   "]));
        let classifier = LanguageClassifier::new(Some(backend));
        assert_eq!(classifier.detect(&["?"], 50).await, "English");
    }

    #[tokio::test]
    async fn sample_is_capped_at_limit() {
        let backend = Arc::new(MockBackend::with_replies(["English"]));
        let classifier = LanguageClassifier::new(Some(backend.clone()));
        let texts: Vec<String> = (0..60).map(|i| format!("msg{:02}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        classifier.detect(&refs, 50).await;

        let prompts = backend.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("msg00 msg01"));
        assert!(prompts[0].contains("msg49"));
        assert!(!prompts[0].contains("msg50"));
    }
}
