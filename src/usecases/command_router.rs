//! Classifies inbound group messages and dispatches `/bot` questions and `/report` requests.
//!
//! Storage always precedes interpretation. The two prefix checks are independent and
//! evaluated in sequence, so a text matching both would run both flows.

use crate::domain::{
    AckHandle, DomainError, IncomingMessage, MAX_MESSAGE_CHARS, MEDIA_PLACEHOLDER, MessageOrigin,
    UNKNOWN_SENDER, split_message,
};
use crate::ports::{ChatTransport, MessageHandler};
use crate::usecases::message_store::MessageStore;
use crate::usecases::report_composer::ReportComposer;
use crate::usecases::report_service::{CHUNK_SEND_DELAY, ReportService};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const BOT_COMMAND_PREFIX: &str = "/bot";
pub const REPORT_COMMAND_PREFIX: &str = "/report";

/// Days of history a `/bot` question is answered from.
pub const QUESTION_WINDOW_DAYS: u32 = 14;

pub const HELP_TEXT: &str = "🤖 The analytics system is ready. Ask a question about group activity.\n\n\
Examples:\n\
• /bot Which projects were discussed?\n\
• /bot Who was the most active?\n\
• /bot What decisions were made?\n\
• /report - get the daily report";
pub const QUESTION_ACK_TEXT: &str =
    "🤖 Analyzing group data... Processing may take up to 30 seconds.";
pub const NO_DATA_TEXT: &str = "❌ No data available for analysis yet. Please try again later.";
pub const ANSWER_HEADER: &str = "🤖 *ANALYTICAL ANSWER*";
pub const QUESTION_ERROR_TEXT: &str =
    "❌ Sorry, the request could not be processed. Please contact the administrator.";
pub const REPORT_ACK_TEXT: &str = "📊 Generating the report... This may take up to 30 seconds.";
pub const REPORT_ERROR_TEXT: &str = "❌ Report generation failed. Please try again later.";

/// A provisional "processing…" reply that is later edited or removed.
///
/// Edits and deletes are best effort: failures are logged and never abort the flow.
pub struct PendingAck<'a> {
    transport: &'a dyn ChatTransport,
    handle: AckHandle,
}

impl<'a> PendingAck<'a> {
    pub async fn acquire(
        transport: &'a dyn ChatTransport,
        to: &IncomingMessage,
        text: &str,
    ) -> Result<Self, DomainError> {
        let handle = transport.reply(to, text).await?;
        Ok(Self { transport, handle })
    }

    /// Replace the acknowledgment with the final text. Returns `false` if the edit failed.
    pub async fn resolve(self, text: &str) -> bool {
        match self.transport.edit(&self.handle, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id = %self.handle.chat_id, error = %e, "failed to edit acknowledgment");
                false
            }
        }
    }

    /// Remove the acknowledgment.
    pub async fn dismiss(self) {
        if let Err(e) = self.transport.delete(&self.handle).await {
            debug!(chat_id = %self.handle.chat_id, error = %e, "failed to delete acknowledgment");
        }
    }
}

/// Per-event classifier and dispatcher. Holds no per-chat state.
pub struct CommandRouter {
    store: Arc<MessageStore>,
    composer: Arc<ReportComposer>,
    reports: Arc<ReportService>,
    transport: Arc<dyn ChatTransport>,
}

impl CommandRouter {
    pub fn new(
        store: Arc<MessageStore>,
        composer: Arc<ReportComposer>,
        reports: Arc<ReportService>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            composer,
            reports,
            transport,
        }
    }

    async fn handle_bot_command(&self, message: &IncomingMessage, question: &str) {
        if let Err(e) = self.answer(message, question).await {
            error!(chat_id = %message.chat_id, error = %e, "error handling bot command");
            self.reply_error(message, QUESTION_ERROR_TEXT).await;
        }
    }

    async fn answer(&self, message: &IncomingMessage, question: &str) -> Result<(), DomainError> {
        if question.is_empty() {
            self.transport.reply(message, HELP_TEXT).await?;
            return Ok(());
        }

        let ack = PendingAck::acquire(self.transport.as_ref(), message, QUESTION_ACK_TEXT).await?;

        let window = self
            .store
            .query_by_days(&message.chat_id, QUESTION_WINDOW_DAYS)
            .await;
        if window.is_empty() {
            ack.resolve(NO_DATA_TEXT).await;
            return Ok(());
        }

        let answer = self.composer.answer_question(question, &window).await?;
        let chunks = split_message(
            &format!("{}\n\n{}", ANSWER_HEADER, answer),
            MAX_MESSAGE_CHARS,
        );
        let Some((first, tail)) = chunks.split_first() else {
            return Ok(());
        };

        // The first chunk replaces the ack; if that edit fails it goes out as a new message.
        let pending = if ack.resolve(first).await {
            tail
        } else {
            &chunks[..]
        };
        for (i, chunk) in pending.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(CHUNK_SEND_DELAY).await;
            }
            self.transport.send_message(&message.chat_id, chunk).await?;
        }

        info!(
            chat_id = %message.chat_id,
            messages = window.len(),
            chunks = chunks.len(),
            "question answered"
        );
        Ok(())
    }

    async fn handle_report_command(&self, message: &IncomingMessage) {
        match PendingAck::acquire(self.transport.as_ref(), message, REPORT_ACK_TEXT).await {
            Ok(ack) => {
                self.reports.send_daily_report(&message.chat_id).await;
                ack.dismiss().await;
            }
            Err(e) => {
                error!(chat_id = %message.chat_id, error = %e, "error handling report command");
                self.reply_error(message, REPORT_ERROR_TEXT).await;
            }
        }
    }

    async fn reply_error(&self, message: &IncomingMessage, text: &str) {
        if let Err(e) = self.transport.reply(message, text).await {
            error!(chat_id = %message.chat_id, error = %e, "failed to send error reply");
        }
    }
}

#[async_trait::async_trait]
impl MessageHandler for CommandRouter {
    async fn handle(&self, message: IncomingMessage) {
        if message.origin != MessageOrigin::User || !message.is_group {
            return;
        }

        let text = if message.text.is_empty() {
            MEDIA_PLACEHOLDER
        } else {
            message.text.as_str()
        };
        let user_name = if message.sender_name.is_empty() {
            UNKNOWN_SENDER
        } else {
            message.sender_name.as_str()
        };

        self.store
            .append(&message.chat_id, &message.sender_id, user_name, text)
            .await;

        if let Some(rest) = strip_command(text, BOT_COMMAND_PREFIX) {
            self.handle_bot_command(&message, rest.trim()).await;
        }

        if strip_command(text, REPORT_COMMAND_PREFIX).is_some() {
            self.handle_report_command(&message).await;
        }
    }
}

/// Remainder of `text` after `prefix`, when `text` starts with it ignoring ASCII case.
fn strip_command<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
