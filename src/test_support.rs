//! In-memory port implementations shared by the use-case tests.

use crate::domain::{AckHandle, Chat, DomainError, IncomingMessage, Message};
use crate::ports::{ChatTransport, MessageRepo};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::time::Instant;

/// Vec-backed [`MessageRepo`]. Counts every port call, failed ones included.
#[derive(Default)]
pub struct InMemoryRepo {
    messages: Mutex<Vec<Message>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let repo = Self::default();
        repo.fail.store(true, Ordering::SeqCst);
        repo
    }

    /// Insert a message with an explicit timestamp, bypassing the port (not counted).
    pub fn seed(&self, chat_id: &str, text: &str, at: DateTime<Utc>) {
        self.messages.lock().unwrap().push(Message {
            chat_id: chat_id.to_string(),
            user_id: "seed".to_string(),
            user_name: "Seeder".to_string(),
            text: text.to_string(),
            timestamp: at,
        });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn messages(&self, chat_id: &str) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn texts(&self, chat_id: &str) -> Vec<String> {
        self.messages(chat_id).into_iter().map(|m| m.text).collect()
    }

    fn enter(&self) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::PersistenceUnavailable(
                "in-memory repo set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageRepo for InMemoryRepo {
    async fn insert_message(
        &self,
        chat_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> Result<(), DomainError> {
        self.enter()?;
        self.messages.lock().unwrap().push(Message {
            chat_id: chat_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn messages_since(
        &self,
        chat_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, DomainError> {
        self.enter()?;
        let mut found: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == chat_id && m.timestamp >= since)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.timestamp);
        Ok(found)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.enter()?;
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.timestamp >= cutoff);
        Ok((before - messages.len()) as u64)
    }
}

/// One successful outbound transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply { chat_id: String, text: String },
    Edit { chat_id: String, text: String },
    Delete { chat_id: String },
    Message { chat_id: String, text: String },
}

/// [`ChatTransport`] that records successful calls in order, with configurable failures.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    send_times: Mutex<Vec<Instant>>,
    groups: Vec<Chat>,
    failing_chats: HashSet<String>,
    fail_replies: bool,
    fail_edits: bool,
    fail_deletes: bool,
    reply_attempts: AtomicUsize,
    next_id: AtomicI64,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, groups: Vec<Chat>) -> Self {
        self.groups = groups;
        self
    }

    /// `send_message` to `chat_id` fails and records nothing.
    pub fn failing_sends_to(mut self, chat_id: &str) -> Self {
        self.failing_chats.insert(chat_id.to_string());
        self
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of standalone messages sent to `chat_id`.
    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { chat_id: c, text } if c == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn reply_attempts(&self) -> usize {
        self.reply_attempts.load(Ordering::SeqCst)
    }

    /// Instants of successful `send_message` calls.
    pub fn send_times(&self) -> Vec<Instant> {
        self.send_times.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

fn refused(what: &str) -> DomainError {
    DomainError::Transport(format!("recording transport refused {}", what))
}

#[async_trait::async_trait]
impl ChatTransport for RecordingTransport {
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<AckHandle, DomainError> {
        self.reply_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_replies {
            return Err(refused("reply"));
        }
        self.record(Sent::Reply {
            chat_id: to.chat_id.clone(),
            text: text.to_string(),
        });
        Ok(AckHandle {
            chat_id: to.chat_id.clone(),
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }

    async fn edit(&self, handle: &AckHandle, text: &str) -> Result<(), DomainError> {
        if self.fail_edits {
            return Err(refused("edit"));
        }
        self.record(Sent::Edit {
            chat_id: handle.chat_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, handle: &AckHandle) -> Result<(), DomainError> {
        if self.fail_deletes {
            return Err(refused("delete"));
        }
        self.record(Sent::Delete {
            chat_id: handle.chat_id.clone(),
        });
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DomainError> {
        if self.failing_chats.contains(chat_id) {
            return Err(refused("send"));
        }
        self.record(Sent::Message {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        self.send_times.lock().unwrap().push(Instant::now());
        Ok(())
    }

    async fn group_chats(&self) -> Result<Vec<Chat>, DomainError> {
        Ok(self.groups.clone())
    }
}
