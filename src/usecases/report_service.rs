//! Single-chat daily report delivery: window -> compose -> frame -> chunk -> send.

use crate::domain::{DomainError, MAX_MESSAGE_CHARS, ReportOutcome, split_message};
use crate::ports::ChatTransport;
use crate::usecases::message_store::MessageStore;
use crate::usecases::report_composer::ReportComposer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Hours of history covered by a daily report.
pub const REPORT_WINDOW_HOURS: u32 = 24;

/// Pause between consecutive chunks of one report.
pub const CHUNK_SEND_DELAY: Duration = Duration::from_secs(1);

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const REPORT_ERROR_NOTICE: &str =
    "❌ Failed to generate the business report. Please check the system logs.";

/// Delivers daily reports to one chat at a time.
pub struct ReportService {
    store: Arc<MessageStore>,
    composer: Arc<ReportComposer>,
    transport: Arc<dyn ChatTransport>,
    chunk_delay: Duration,
}

impl ReportService {
    pub fn new(
        store: Arc<MessageStore>,
        composer: Arc<ReportComposer>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            composer,
            transport,
            chunk_delay: CHUNK_SEND_DELAY,
        }
    }

    /// Generate and send the report, propagating any failure to the caller.
    ///
    /// An empty 24h window is a normal outcome: nothing is sent.
    pub async fn deliver_daily_report(&self, chat_id: &str) -> Result<ReportOutcome, DomainError> {
        info!(chat_id, "generating daily report");

        let window = self.store.query_by_hours(chat_id, REPORT_WINDOW_HOURS).await;
        if window.is_empty() {
            info!(chat_id, "no messages found for daily report");
            return Ok(ReportOutcome::NoMessages);
        }

        let body = self.composer.compose_daily_report(&window).await?;
        let framed = frame_report(&body, Utc::now());

        let chunks = if framed.chars().count() > MAX_MESSAGE_CHARS {
            split_message(&framed, MAX_MESSAGE_CHARS)
        } else {
            vec![framed]
        };

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }
            self.transport.send_message(chat_id, chunk).await?;
        }

        info!(chat_id, chunks = chunks.len(), "daily report sent");
        Ok(ReportOutcome::Sent {
            chunks: chunks.len(),
        })
    }

    /// Generate and send the report; on failure log and notify the chat (best effort).
    pub async fn send_daily_report(&self, chat_id: &str) -> Option<ReportOutcome> {
        match self.deliver_daily_report(chat_id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(chat_id, error = %e, "error generating daily report");
                if let Err(notify_err) = self
                    .transport
                    .send_message(chat_id, REPORT_ERROR_NOTICE)
                    .await
                {
                    error!(chat_id, error = %notify_err, "failed to send error notification");
                }
                None
            }
        }
    }
}

/// Wrap a generated report body with the fixed header and footer.
pub fn frame_report(body: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%B %-d, %Y, %I:%M %p");
    format!(
        "📊 *DAILY BUSINESS REPORT*\n📅 {} UTC\n📈 Group activity analysis\n{}\n\n{}\n{}\n🤖 _tg-digest | Business analytics_",
        timestamp, SEPARATOR, body, SEPARATOR
    )
}
