//! Message log on libsql. Implements MessageRepo.
//!
//! Works against a local SQLite file or a remote libsql/Turso database, picked from the URL.
//! Single `messages` table; timestamps are UTC unix seconds assigned by the database.

use crate::domain::{DomainError, Message};
use crate::ports::MessageRepo;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use std::path::Path;
use tracing::info;

const MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    platform TEXT NOT NULL DEFAULT 'telegram',
    chat_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    user_name TEXT NOT NULL DEFAULT '',
    message_text TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
)"#;
const MESSAGES_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages (chat_id)",
    "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages (user_id)",
];

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::PersistenceUnavailable(e.to_string())
}

/// True for URLs served by a libsql server rather than a local file.
pub fn is_remote_url(url: &str) -> bool {
    ["libsql://", "https://", "http://", "wss://", "ws://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// libsql repository. Safe to share via Arc; each call opens its own connection.
pub struct SqliteRepo {
    db: Database,
}

impl SqliteRepo {
    /// Connect to (or create) the database and ensure the schema exists.
    ///
    /// `database_url` is either a filesystem path or a `libsql://` / `https://` URL, in which
    /// case `auth_token` is sent to the server.
    pub async fn connect(database_url: &str, auth_token: Option<&str>) -> Result<Self, DomainError> {
        let remote = is_remote_url(database_url);
        let db = if remote {
            libsql::Builder::new_remote(
                database_url.to_string(),
                auth_token.unwrap_or_default().to_string(),
            )
            .build()
            .await
            .map_err(repo_err)?
        } else {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(repo_err)?;
                }
            }
            libsql::Builder::new_local(database_url)
                .build()
                .await
                .map_err(repo_err)?
        };
        let conn = db.connect().map_err(repo_err)?;

        if !remote {
            // PRAGMA returns a row (new value); execute fails when rows are returned.
            for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
                let mut rows = conn
                    .query(pragma, ())
                    .await
                    .map_err(|e| repo_err(format!("{} failed: {}", pragma, e)))?;
                while rows.next().await.map_err(repo_err)?.is_some() {}
            }
        }

        conn.execute(MESSAGES_TABLE, ()).await.map_err(repo_err)?;
        for index in MESSAGES_INDEXES {
            conn.execute(index, ()).await.map_err(repo_err)?;
        }

        info!(remote, "message database connected");
        Ok(Self { db })
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    /// Insert with an explicit timestamp.
    #[cfg(test)]
    pub async fn insert_message_at(
        &self,
        chat_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.conn()?
            .execute(
                r#"
                INSERT INTO messages (platform, chat_id, user_id, user_name, message_text, created_at)
                VALUES ('telegram', ?1, ?2, ?3, ?4, ?5)
                "#,
                params![chat_id, user_id, user_name, text, at.timestamp()],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageRepo for SqliteRepo {
    async fn insert_message(
        &self,
        chat_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> Result<(), DomainError> {
        self.conn()?
            .execute(
                r#"
                INSERT INTO messages (platform, chat_id, user_id, user_name, message_text)
                VALUES ('telegram', ?1, ?2, ?3, ?4)
                "#,
                params![chat_id, user_id, user_name, text],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }

    async fn messages_since(
        &self,
        chat_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, DomainError> {
        let mut rows = self
            .conn()?
            .query(
                r#"
                SELECT chat_id, user_id, user_name, message_text, created_at
                FROM messages
                WHERE chat_id = ?1 AND created_at >= ?2
                ORDER BY created_at ASC, id ASC
                "#,
                params![chat_id, since.timestamp()],
            )
            .await
            .map_err(repo_err)?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            let created_at: i64 = row.get(4).map_err(repo_err)?;
            let timestamp = DateTime::from_timestamp(created_at, 0)
                .ok_or_else(|| repo_err(format!("invalid created_at {}", created_at)))?;
            messages.push(Message {
                chat_id: row.get(0).map_err(repo_err)?,
                user_id: row.get(1).map_err(repo_err)?,
                user_name: row.get::<String>(2).unwrap_or_default(),
                text: row.get::<String>(3).unwrap_or_default(),
                timestamp,
            });
        }
        Ok(messages)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let removed = self
            .conn()?
            .execute(
                "DELETE FROM messages WHERE created_at < ?1",
                params![cutoff.timestamp()],
            )
            .await
            .map_err(repo_err)?;
        info!(removed, cutoff = %cutoff, "deleted old messages");
        Ok(removed)
    }
}
