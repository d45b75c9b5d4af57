//! AuthPort over the shared grammers client.
//!
//! The login flow is a small state machine: a requested code parks a login token, a
//! 2FA-protected account parks a password token, and each step consumes what the
//! previous one left behind.

use crate::domain::DomainError;
use crate::ports::{AuthPort, SignInResult};
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tokio::sync::Mutex;
use tracing::debug;

/// Where the interactive login currently stands.
enum LoginStage<C, P> {
    Idle,
    AwaitingCode(C),
    AwaitingPassword(P),
}

impl<C, P> LoginStage<C, P> {
    fn take_code_token(&mut self) -> Result<C, DomainError> {
        match std::mem::replace(self, Self::Idle) {
            Self::AwaitingCode(token) => Ok(token),
            other => {
                *self = other;
                Err(DomainError::Auth("no login code was requested".into()))
            }
        }
    }

    fn take_password_token(&mut self) -> Result<P, DomainError> {
        match std::mem::replace(self, Self::Idle) {
            Self::AwaitingPassword(token) => Ok(token),
            other => {
                *self = other;
                Err(DomainError::Auth("no password was requested".into()))
            }
        }
    }
}

pub struct GrammersAuthAdapter {
    client: Client,
    stage: Mutex<LoginStage<LoginToken, PasswordToken>>,
}

impl GrammersAuthAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            stage: Mutex::new(LoginStage::Idle),
        }
    }
}

fn sign_in_error(e: SignInError) -> DomainError {
    let reason = match e {
        SignInError::InvalidCode => "the login code was rejected, restart to get a new one".into(),
        SignInError::SignUpRequired => {
            "this number has no Telegram account, register it in an official app first".into()
        }
        other => other.to_string(),
    };
    DomainError::Auth(format!("sign in: {}", reason))
}

#[async_trait]
impl AuthPort for GrammersAuthAdapter {
    async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| DomainError::Auth(format!("session check: {}", e)))
    }

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError> {
        let token = self
            .client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| DomainError::Auth(format!("request login code: {}", e)))?;
        *self.stage.lock().await = LoginStage::AwaitingCode(token);
        debug!("awaiting login code");
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
        let mut stage = self.stage.lock().await;
        let token = stage.take_code_token()?;
        match self.client.sign_in(&token, code).await {
            Ok(_user) => Ok(SignInResult::Success),
            Err(SignInError::PasswordRequired(pt)) => {
                let hint = pt.hint().map(String::from);
                *stage = LoginStage::AwaitingPassword(pt);
                debug!("awaiting 2FA password");
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(e) => Err(sign_in_error(e)),
        }
    }

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
        let token = self.stage.lock().await.take_password_token()?;
        self.client
            .check_password(token, password)
            .await
            .map_err(|e| DomainError::Auth(format!("check password: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Stage = LoginStage<&'static str, u32>;

    #[test]
    fn code_token_is_consumed_once() {
        let mut stage = Stage::AwaitingCode("login");
        assert_eq!(stage.take_code_token().unwrap(), "login");
        assert!(matches!(stage, LoginStage::Idle));
        assert!(matches!(stage.take_code_token(), Err(DomainError::Auth(_))));
    }

    #[test]
    fn password_before_sign_in_is_rejected_without_losing_the_code() {
        let mut stage = Stage::AwaitingCode("login");
        assert!(stage.take_password_token().is_err());
        assert_eq!(stage.take_code_token().unwrap(), "login");
    }

    #[test]
    fn password_token_follows_sign_in() {
        let mut stage = Stage::AwaitingPassword(7);
        assert!(stage.take_code_token().is_err());
        assert_eq!(stage.take_password_token().unwrap(), 7);
        assert!(matches!(stage, LoginStage::Idle));
    }
}
