//! Builds report and answer prompts from a message window and calls the backend.
//!
//! Unlike ingestion, this is the interactive tier: generation failures propagate to the
//! caller, who has a human waiting for a reply.

use crate::domain::prompts::{CONNECTION_PROBE_PROMPT, answer_prompt};
use crate::domain::{DomainError, MessageWindow, template_for};
use crate::ports::GenerativeBackend;
use crate::usecases::language::{LanguageClassifier, REPORT_SAMPLE_LIMIT};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Report and Q&A composer.
///
/// Constructed either with a backend (initialized) or without one, in which case both
/// entry points fail with [`DomainError::BackendUninitialized`].
pub struct ReportComposer {
    backend: Option<Arc<dyn GenerativeBackend>>,
    classifier: LanguageClassifier,
}

impl ReportComposer {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            classifier: LanguageClassifier::new(Some(Arc::clone(&backend))),
            backend: Some(backend),
        }
    }

    /// Composer without a backend (credential missing or initialization failed).
    pub fn uninitialized() -> Self {
        Self {
            backend: None,
            classifier: LanguageClassifier::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&Arc<dyn GenerativeBackend>, DomainError> {
        self.backend
            .as_ref()
            .ok_or(DomainError::BackendUninitialized)
    }

    /// Daily business report over `window`, in the window's dominant language.
    pub async fn compose_daily_report(&self, window: &MessageWindow) -> Result<String, DomainError> {
        let backend = self.backend()?;

        let language = self
            .classifier
            .detect(&window.texts(REPORT_SAMPLE_LIMIT), REPORT_SAMPLE_LIMIT)
            .await;
        let template = template_for(&language);
        let prompt = template.render(&window.transcript());
        debug!(
            language = %language,
            ?template,
            messages = window.len(),
            prompt_len = prompt.len(),
            "composing daily report"
        );

        backend.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "failed to generate daily report");
            e
        })
    }

    /// Answer `question` from `window` only, in the window's dominant language.
    pub async fn answer_question(
        &self,
        question: &str,
        window: &MessageWindow,
    ) -> Result<String, DomainError> {
        let backend = self.backend()?;

        let language = self.classifier.detect(&window.texts(window.len()), window.len()).await;
        let prompt = answer_prompt(question, &language, &window.transcript());
        debug!(
            language = %language,
            messages = window.len(),
            prompt_len = prompt.len(),
            "answering question"
        );

        backend.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "failed to answer question");
            e
        })
    }

    /// Send a fixed probe prompt. Returns false (and logs) when the backend is missing or fails.
    pub async fn test_connection(&self) -> bool {
        let Ok(backend) = self.backend() else {
            return false;
        };
        match backend.generate(CONNECTION_PROBE_PROMPT).await {
            Ok(reply) => {
                info!(reply = %reply.trim(), "generative backend test successful");
                true
            }
            Err(e) => {
                error!(error = %e, "generative backend test failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockBackend;
    use crate::domain::Message;
    use chrono::{Duration, Utc};

    fn window(texts: &[&str]) -> MessageWindow {
        let start = Utc::now() - Duration::hours(3);
        MessageWindow::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Message {
                    chat_id: "G1".into(),
                    user_id: format!("u{}", i),
                    user_name: format!("User{}", i),
                    text: t.to_string(),
                    timestamp: start + Duration::minutes(i as i64),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn uninitialized_composer_rejects_both_entry_points() {
        let composer = ReportComposer::uninitialized();
        let w = window(&["hi"]);
        assert!(matches!(
            composer.compose_daily_report(&w).await,
            Err(DomainError::BackendUninitialized)
        ));
        assert!(matches!(
            composer.answer_question("what?", &w).await,
            Err(DomainError::BackendUninitialized)
        ));
        assert!(!composer.test_connection().await);
    }

    #[tokio::test]
    async fn report_uses_template_of_detected_language() {
        let backend = Arc::new(MockBackend::with_replies(["Russian", "отчет"]));
        let composer = ReportComposer::new(backend.clone());
        let report = composer
            .compose_daily_report(&window(&["привет", "как дела"]))
            .await
            .unwrap();
        assert_eq!(report, "отчет");

        let prompts = backend.prompts().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Отвечай на русском языке."));
        assert!(prompts[1].contains("User0: привет"));
        assert!(prompts[1].contains("User1: как дела"));
    }

    #[tokio::test]
    async fn report_without_dedicated_template_uses_english() {
        let backend = Arc::new(MockBackend::with_replies(["Spanish", "report"]));
        let composer = ReportComposer::new(backend.clone());
        composer
            .compose_daily_report(&window(&["hola"]))
            .await
            .unwrap();
        let prompts = backend.prompts().await;
        assert!(prompts[1].contains("Respond in English."));
    }

    #[tokio::test]
    async fn report_language_sample_is_capped_at_fifty() {
        let backend = Arc::new(MockBackend::with_replies(["English", "report"]));
        let composer = ReportComposer::new(backend.clone());
        let texts: Vec<String> = (0..70).map(|i| format!("m{:02}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        composer.compose_daily_report(&window(&refs)).await.unwrap();

        let prompts = backend.prompts().await;
        assert!(prompts[0].contains("m49"));
        assert!(!prompts[0].contains("m50"));
        assert!(prompts[1].contains("m69"));
    }

    #[tokio::test]
    async fn answer_embeds_question_exactly_once() {
        let backend = Arc::new(MockBackend::with_replies(["German", "Antwort"]));
        let composer = ReportComposer::new(backend.clone());
        let question = "Which decisions were made about the Q3 budget?";
        let answer = composer
            .answer_question(question, &window(&["Budget ist genehmigt"]))
            .await
            .unwrap();
        assert_eq!(answer, "Antwort");

        let prompts = backend.prompts().await;
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1].matches(question).count(), 1);
        assert!(prompts[1].contains("Respond in: German"));
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let composer = ReportComposer::new(Arc::new(MockBackend::failing()));
        assert!(matches!(
            composer.compose_daily_report(&window(&["hi"])).await,
            Err(DomainError::BackendCallFailed(_))
        ));
        assert!(matches!(
            composer.answer_question("q", &window(&["hi"])).await,
            Err(DomainError::BackendCallFailed(_))
        ));
    }
}
