//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AckHandle, Chat, DomainError, IncomingMessage, Message};
use chrono::{DateTime, Utc};

/// Persistence collaborator. An ordered store used only through insert, select by chat
/// and cutoff, and delete by age. Callers decide how failures are absorbed.
#[async_trait::async_trait]
pub trait MessageRepo: Send + Sync {
    /// Insert one message; the store assigns the timestamp.
    async fn insert_message(
        &self,
        chat_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> Result<(), DomainError>;

    /// All messages of `chat_id` with timestamp >= `since`, ascending by timestamp.
    async fn messages_since(
        &self,
        chat_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, DomainError>;

    /// Delete every message older than `cutoff`. Returns the number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}

/// Generative-text backend. Stateless per call, free text in and out.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Chat transport. Session and authentication lifecycle are the adapter's concern.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Reply to an inbound message. The returned handle can later be edited or deleted.
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<AckHandle, DomainError>;

    /// Replace the text of a message previously sent by us.
    async fn edit(&self, handle: &AckHandle, text: &str) -> Result<(), DomainError>;

    /// Delete a message previously sent by us.
    async fn delete(&self, handle: &AckHandle) -> Result<(), DomainError>;

    /// Send a standalone message to a chat.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DomainError>;

    /// Every group chat the account participates in.
    async fn group_chats(&self) -> Result<Vec<Chat>, DomainError>;
}

/// Login step result returned by [`AuthPort::sign_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    PasswordRequired { hint: Option<String> },
}

/// Transport session authentication (phone code, optional 2FA password).
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    async fn is_authenticated(&self) -> Result<bool, DomainError>;

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError>;

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError>;

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError>;
}
