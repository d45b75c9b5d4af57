//! Session management and client bootstrap.
//!
//! Uses grammers-session's SqliteSession for persistent file-based storage so
//! authorization is preserved across application restarts.

use crate::domain::DomainError;
use grammers_client::Client;
use grammers_client::client::{UpdateStream, UpdatesConfiguration};
use grammers_session::storages::SqliteSession;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Opens a persistent session storage at the given path.
///
/// The file is created if it does not exist. Parent directories are created as needed.
pub async fn open_file_session(path: impl AsRef<Path>) -> Result<SqliteSession, DomainError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Transport(format!("create session directory: {}", e)))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| DomainError::Transport(format!("open session file: {}", e)))
}

/// A connected client plus the pieces that keep it alive.
pub struct TelegramConnection {
    pub client: Client,
    /// Inbound updates; hand to [`super::client::run_update_loop`].
    pub updates: UpdateStream,
    /// Network runner. Aborting it disconnects the client.
    pub runner: JoinHandle<()>,
}

/// Open the session at `session_path` and start the sender pool.
pub async fn connect(api_id: i32, session_path: &Path) -> Result<TelegramConnection, DomainError> {
    let session = Arc::new(open_file_session(session_path).await?);
    let pool = grammers_client::SenderPool::new(session, api_id);
    let client = Client::new(pool.handle.clone());
    let runner = pool.runner;
    let runner = tokio::spawn(async move {
        runner.run().await;
    });
    let updates = client.stream_updates(
        pool.updates,
        UpdatesConfiguration {
            catch_up: false,
            ..Default::default()
        },
    );
    info!(path = %session_path.display(), "telegram session opened");
    Ok(TelegramConnection {
        client,
        updates,
        runner,
    })
}
