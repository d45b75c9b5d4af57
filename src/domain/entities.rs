//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/IO types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body stored for inbound messages that carry no text (photos, stickers, service events).
pub const MEDIA_PLACEHOLDER: &str = "[Media/System Message]";

/// Display name stored when the sender has no resolvable name.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// A stored chat message. Immutable once persisted; removed only by the retention sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub chat_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    /// Assigned by the store at insert time.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Transcript line fed to the generative backend: `[timestamp] userName: text`.
    pub fn transcript_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.user_name,
            self.text
        )
    }
}

/// Messages of one chat inside a time window, ascending by timestamp.
///
/// Derived per request, never persisted. An empty window means "no data in range";
/// a degraded [`crate::usecases::MessageStore`] produces the same empty window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageWindow {
    messages: Vec<Message>,
}

impl MessageWindow {
    /// Build a window, sorting by timestamp. The sort is stable so store order breaks ties.
    pub fn new(mut messages: Vec<Message>) -> Self {
        messages.sort_by_key(|m| m.timestamp);
        Self { messages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Up to `limit` message texts, in window order.
    pub fn texts(&self, limit: usize) -> Vec<&str> {
        self.messages
            .iter()
            .take(limit)
            .map(|m| m.text.as_str())
            .collect()
    }

    /// Every message rendered as a transcript line, joined by newlines.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A chat known to the transport. Only group chats take part in scheduled fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_group(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// Where an inbound event came from. Broadcasts and service events are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    User,
    Broadcast,
    System,
}

/// An inbound event as seen by the command router. Mapped from the transport's native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: String,
    /// Transport message id; replies are threaded to it.
    pub message_id: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub is_group: bool,
    pub origin: MessageOrigin,
    pub text: String,
}

/// Reference to a message the bot sent earlier (e.g. a "processing…" acknowledgment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckHandle {
    pub chat_id: String,
    pub message_id: i64,
}

/// Outcome of the single-chat daily report flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The 24h window was empty; nothing was sent.
    NoMessages,
    /// Report delivered in `chunks` transport messages.
    Sent { chunks: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(name: &str, text: &str, hour: u32) -> Message {
        Message {
            chat_id: "G1".into(),
            user_id: format!("u-{}", name),
            user_name: name.into(),
            text: text.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn window_sorts_ascending() {
        let window = MessageWindow::new(vec![msg("b", "second", 12), msg("a", "first", 9)]);
        assert_eq!(window.texts(10), vec!["first", "second"]);
    }

    #[test]
    fn transcript_renders_one_line_per_message() {
        let window = MessageWindow::new(vec![msg("Alice", "hi", 9), msg("Bob", "hello", 10)]);
        assert_eq!(
            window.transcript(),
            "[2024-05-01 09:00:00] Alice: hi\n[2024-05-01 10:00:00] Bob: hello"
        );
    }

    #[test]
    fn texts_respects_limit() {
        let window = MessageWindow::new((0..5).map(|h| msg("a", "x", h)).collect());
        assert_eq!(window.texts(3).len(), 3);
    }

    #[test]
    fn group_kinds() {
        assert!(ChatKind::Group.is_group());
        assert!(ChatKind::Supergroup.is_group());
        assert!(!ChatKind::Private.is_group());
        assert!(!ChatKind::Channel.is_group());
    }
}
