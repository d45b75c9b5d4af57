//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod chunker;
pub mod entities;
pub mod errors;
pub mod prompts;
pub mod schedule;

pub use chunker::{MAX_MESSAGE_CHARS, split_message};
pub use entities::{
    AckHandle, Chat, ChatKind, IncomingMessage, MEDIA_PLACEHOLDER, Message, MessageOrigin,
    MessageWindow, ReportOutcome, UNKNOWN_SENDER,
};
pub use errors::DomainError;
pub use prompts::{FALLBACK_LANGUAGE, ReportTemplate, template_for};
pub use schedule::ScheduleConfig;
