//! Implements LoginPrompt. Inquire-based interactive prompts for the session login.
//!
//! Inquire blocks on the terminal, so every prompt runs on the blocking pool.

use crate::domain::DomainError;
use crate::ports::LoginPrompt;
use async_trait::async_trait;
use inquire::{Password, PasswordDisplayMode, Text};

/// Terminal prompts for phone number, login code and 2FA password.
#[derive(Debug, Default)]
pub struct TuiLoginPrompt;

impl TuiLoginPrompt {
    pub fn new() -> Self {
        Self
    }
}

async fn blocking_prompt<F>(prompt: F) -> Result<String, DomainError>
where
    F: FnOnce() -> Result<String, inquire::InquireError> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| DomainError::Auth(format!("prompt task: {}", e)))?
        .map_err(|e| DomainError::Auth(e.to_string()))
}

#[async_trait]
impl LoginPrompt for TuiLoginPrompt {
    async fn phone_number(&self) -> Result<String, DomainError> {
        blocking_prompt(|| {
            Text::new("Phone number:")
                .with_help_message("International format, e.g. +15550100")
                .prompt()
        })
        .await
    }

    async fn login_code(&self) -> Result<String, DomainError> {
        blocking_prompt(|| {
            Text::new("Login code:")
                .with_help_message("Sent to your Telegram app")
                .prompt()
        })
        .await
    }

    async fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
        let message = match hint {
            Some(h) => format!("2FA password (hint: {}):", h),
            None => "2FA password:".to_string(),
        };
        blocking_prompt(move || {
            Password::new(&message)
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()
        })
        .await
    }
}
