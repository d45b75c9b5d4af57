//! Inbound ports. Adapters (transport update loop, UI) call into the application.

use crate::domain::{DomainError, IncomingMessage};

/// Receives every inbound chat event. Implementations never fail the caller's loop.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: IncomingMessage);
}

/// Interactive credential source for the login flow.
#[async_trait::async_trait]
pub trait LoginPrompt: Send + Sync {
    async fn phone_number(&self) -> Result<String, DomainError>;

    async fn login_code(&self) -> Result<String, DomainError>;

    async fn password(&self, hint: Option<&str>) -> Result<String, DomainError>;
}
