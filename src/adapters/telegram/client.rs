//! Implements ChatTransport using grammers Client, and drives the inbound update loop.
//!
//! Handles FloodWait by sleeping and retrying. Peers are cached by dialog id so sends
//! don't call iter_dialogs every time.

use crate::adapters::telegram::mapper;
use crate::domain::{AckHandle, Chat, DomainError, IncomingMessage};
use crate::ports::{ChatTransport, MessageHandler};
use async_trait::async_trait;
use grammers_client::client::UpdateStream;
use grammers_client::message::InputMessage;
use grammers_client::peer::Peer;
use grammers_client::update::Update;
use grammers_client::{Client, InvocationError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const FLOOD_WAIT_RETRIES: usize = 3;

fn transport_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Transport(e.to_string())
}

/// Telegram transport adapter. Shares its client (and session) with the auth adapter.
pub struct GrammersTransport {
    client: Client,
    peer_cache: Mutex<HashMap<i64, Peer>>,
}

impl GrammersTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Walk all dialogs, refreshing the peer cache. Returns them as domain chats.
    async fn scan_dialogs(&self) -> Result<Vec<Chat>, DomainError> {
        let mut dialogs = self.client.iter_dialogs();
        let mut chats = Vec::new();
        let mut cache = self.peer_cache.lock().await;
        while let Some(dialog) = dialogs.next().await.map_err(transport_err)? {
            let peer = dialog.peer();
            cache.insert(peer.id().bot_api_dialog_id(), peer.clone());
            chats.push(mapper::chat_from_peer(peer));
        }
        Ok(chats)
    }

    async fn resolve_peer(&self, chat_id: &str) -> Result<Peer, DomainError> {
        let id = mapper::parse_chat_id(chat_id)
            .ok_or_else(|| DomainError::Transport(format!("invalid chat id '{}'", chat_id)))?;
        if let Some(peer) = self.peer_cache.lock().await.get(&id) {
            return Ok(peer.clone());
        }
        self.scan_dialogs().await?;
        self.peer_cache
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::Transport(format!("peer {} not found in dialogs", id)))
    }
}

/// Run `op`, sleeping through FLOOD_WAIT responses.
async fn with_flood_wait<T, F, Fut>(what: &str, mut op: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InvocationError>>,
{
    for attempt in 0..FLOOD_WAIT_RETRIES {
        match op().await {
            Ok(v) => return Ok(v),
            Err(InvocationError::Rpc(rpc)) if rpc.code == 420 => {
                let wait_secs = rpc.value.unwrap_or(60) as u64;
                warn!(attempt, wait_secs, what, "FloodWait, sleeping");
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
            }
            Err(e) => return Err(DomainError::Transport(format!("{}: {}", what, e))),
        }
    }
    Err(DomainError::Transport(format!("{}: FloodWait max retries", what)))
}

fn message_id(handle: &AckHandle) -> Result<i32, DomainError> {
    i32::try_from(handle.message_id).map_err(|_| {
        DomainError::Transport(format!("message id {} out of range", handle.message_id))
    })
}

#[async_trait]
impl ChatTransport for GrammersTransport {
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<AckHandle, DomainError> {
        let peer = self.resolve_peer(&to.chat_id).await?;
        let reply_to = i32::try_from(to.message_id).ok();
        let (peer, client) = (&peer, &self.client);
        let sent = with_flood_wait("reply", move || async move {
            let peer_ref = peer.to_ref().await.ok_or(InvocationError::Dropped)?;
            client
                .send_message(peer_ref, InputMessage::new().text(text).reply_to(reply_to))
                .await
        })
        .await?;
        Ok(AckHandle {
            chat_id: to.chat_id.clone(),
            message_id: i64::from(sent.id()),
        })
    }

    async fn edit(&self, handle: &AckHandle, text: &str) -> Result<(), DomainError> {
        let peer = self.resolve_peer(&handle.chat_id).await?;
        let id = message_id(handle)?;
        let (peer, client) = (&peer, &self.client);
        with_flood_wait("edit", move || async move {
            let peer_ref = peer.to_ref().await.ok_or(InvocationError::Dropped)?;
            client
                .edit_message(peer_ref, id, InputMessage::new().text(text))
                .await
        })
        .await
    }

    async fn delete(&self, handle: &AckHandle) -> Result<(), DomainError> {
        let peer = self.resolve_peer(&handle.chat_id).await?;
        let id = message_id(handle)?;
        let (peer, client) = (&peer, &self.client);
        let removed = with_flood_wait("delete", move || async move {
            let peer_ref = peer.to_ref().await.ok_or(InvocationError::Dropped)?;
            client.delete_messages(peer_ref, &[id]).await
        })
        .await?;
        debug!(chat_id = %handle.chat_id, removed, "acknowledgment deleted");
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DomainError> {
        let peer = self.resolve_peer(chat_id).await?;
        let (peer, client) = (&peer, &self.client);
        with_flood_wait("send", move || async move {
            let peer_ref = peer.to_ref().await.ok_or(InvocationError::Dropped)?;
            client
                .send_message(peer_ref, InputMessage::new().text(text))
                .await
        })
        .await?;
        Ok(())
    }

    async fn group_chats(&self) -> Result<Vec<Chat>, DomainError> {
        let chats = self.scan_dialogs().await?;
        Ok(chats.into_iter().filter(Chat::is_group).collect())
    }
}

/// Feed every inbound message to `handler` until the update stream fails.
///
/// Our own outgoing messages are skipped. Each event is handled on its own task so a
/// slow `/bot` answer never delays ingestion of the next message.
pub async fn run_update_loop(
    mut updates: UpdateStream,
    handler: Arc<dyn MessageHandler>,
) -> Result<(), DomainError> {
    info!("listening for messages");
    loop {
        let update = updates.next().await.map_err(transport_err)?;
        let Update::NewMessage(message) = update else {
            continue;
        };
        if message.outgoing() {
            continue;
        }
        let incoming = mapper::incoming_from_message(&message);
        debug!(chat_id = %incoming.chat_id, origin = ?incoming.origin, "update received");
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(incoming).await;
        });
    }
}

/// Drive `update_loop` until it ends or `shutdown` resolves.
///
/// Only the shutdown path is `Ok`. The update loop never finishes on its own while the
/// connection is healthy, so any return from it is reported as a transport error.
pub async fn run_until_shutdown<L, S>(update_loop: L, shutdown: S) -> Result<(), DomainError>
where
    L: Future<Output = Result<(), DomainError>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        res = update_loop => match res {
            Ok(()) => Err(DomainError::Transport("update stream closed".into())),
            Err(e) => Err(e),
        },
        _ = shutdown => Ok(()),
    }
}
