//! Best-effort message log over the persistence collaborator.
//!
//! Nothing here ever fails the caller: inserts are dropped, queries come back empty and
//! purges report zero when the repository is missing or erroring. An empty window is
//! therefore "no data in range" and "store is down" at the same time.

use crate::domain::MessageWindow;
use crate::ports::MessageRepo;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Message log. Holds the repository only when the connection succeeded at startup.
pub struct MessageStore {
    repo: Option<Arc<dyn MessageRepo>>,
}

impl MessageStore {
    pub fn new(repo: Arc<dyn MessageRepo>) -> Self {
        Self { repo: Some(repo) }
    }

    /// Store whose connection never came up. Every operation degrades to its default.
    pub fn disconnected() -> Self {
        Self { repo: None }
    }

    pub fn is_connected(&self) -> bool {
        self.repo.is_some()
    }

    /// Persist one message. The store assigns the timestamp. Failures are logged and dropped.
    pub async fn append(&self, chat_id: &str, user_id: &str, user_name: &str, text: &str) {
        let Some(repo) = &self.repo else {
            warn!(chat_id, "store not connected, skipping message insert");
            return;
        };
        if chat_id.is_empty() || user_id.is_empty() {
            warn!(chat_id, user_id, "message without chat or user id, dropping");
            return;
        }
        match repo.insert_message(chat_id, user_id, user_name, text).await {
            Ok(()) => debug!(chat_id, user_id, "message stored"),
            Err(e) => error!(chat_id, error = %e, "failed to insert message"),
        }
    }

    /// Messages of `chat_id` from the last `hours` hours, ascending.
    pub async fn query_by_hours(&self, chat_id: &str, hours: u32) -> MessageWindow {
        self.query_window(chat_id, Duration::hours(i64::from(hours)))
            .await
    }

    /// Messages of `chat_id` from the last `days` days, ascending.
    pub async fn query_by_days(&self, chat_id: &str, days: u32) -> MessageWindow {
        self.query_window(chat_id, Duration::days(i64::from(days)))
            .await
    }

    async fn query_window(&self, chat_id: &str, span: Duration) -> MessageWindow {
        let Some(repo) = &self.repo else {
            warn!(chat_id, "store not connected, returning empty window");
            return MessageWindow::empty();
        };
        let since = Utc::now() - span;
        match repo.messages_since(chat_id, since).await {
            Ok(messages) => MessageWindow::new(messages),
            Err(e) => {
                error!(chat_id, error = %e, "failed to load messages");
                MessageWindow::empty()
            }
        }
    }

    /// Delete messages older than `days` days. Returns the number removed (0 on failure).
    pub async fn purge_older_than(&self, days: u32) -> u64 {
        let Some(repo) = &self.repo else {
            warn!("store not connected, skipping cleanup");
            return 0;
        };
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        match repo.delete_older_than(cutoff).await {
            Ok(count) => {
                info!(count, retention_days = days, "cleaned up old messages");
                count
            }
            Err(e) => {
                error!(error = %e, "failed to clean up old messages");
                0
            }
        }
    }
}
