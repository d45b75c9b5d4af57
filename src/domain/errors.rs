//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. An empty message window is not an
//! error; it is reported as [`crate::domain::ReportOutcome::NoMessages`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Credential missing or backend initialization never completed.
    /// Fatal to report/answer features, not to ingestion.
    #[error("Generative backend is not initialized")]
    BackendUninitialized,

    #[error("Generative backend call failed: {0}")]
    BackendCallFailed(String),

    /// Connection or query failure. Always absorbed by the message store.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
