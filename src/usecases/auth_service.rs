//! Login / 2FA flow. Credentials come from a [`LoginPrompt`]; the session is the adapter's.

use crate::domain::DomainError;
use crate::ports::{AuthPort, LoginPrompt, SignInResult};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
    prompt: Arc<dyn LoginPrompt>,
    api_hash: String,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthPort>, prompt: Arc<dyn LoginPrompt>, api_hash: String) -> Self {
        Self {
            auth,
            prompt,
            api_hash,
        }
    }

    pub async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.auth.is_authenticated().await
    }

    /// Run full auth flow (phone -> code -> 2FA if needed). No-op on a saved session.
    pub async fn run_auth_flow(&self) -> Result<(), DomainError> {
        if self.is_authenticated().await? {
            info!("session already authorized");
            return Ok(());
        }

        let phone = self.prompt.phone_number().await?;
        self.auth
            .request_login_code(phone.trim(), &self.api_hash)
            .await?;
        info!("login code requested");

        let code = self.prompt.login_code().await?;
        match self.auth.sign_in(code.trim()).await? {
            SignInResult::Success => {}
            SignInResult::PasswordRequired { hint } => {
                let password = self.prompt.password(hint.as_deref()).await?;
                self.auth.check_password(password.as_bytes()).await?;
            }
        }
        info!("signed in");
        Ok(())
    }
}
