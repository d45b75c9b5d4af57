//! Map grammers types to domain entities.
//!
//! Chat ids cross the port boundary as Bot API dialog ids rendered to strings.

use crate::domain::{Chat, ChatKind, IncomingMessage, MessageOrigin};
use grammers_client::message::Message as TgMessage;
use grammers_client::peer::Peer;

/// Map a grammers Peer to a domain ChatKind.
///
/// * `Peer::User` → Private (DM).
/// * `Peer::Group` → Group or Supergroup (Supergroup when megagroup).
/// * `Peer::Channel` → Channel (broadcast).
pub fn chat_kind_from_peer(peer: &Peer) -> ChatKind {
    match peer {
        Peer::User(_) => ChatKind::Private,
        Peer::Group(g) => {
            if g.is_megagroup() {
                ChatKind::Supergroup
            } else {
                ChatKind::Group
            }
        }
        Peer::Channel(_) => ChatKind::Channel,
    }
}

pub fn chat_from_peer(peer: &Peer) -> Chat {
    let id = peer.id().bot_api_dialog_id();
    Chat {
        id: id.to_string(),
        title: peer
            .name()
            .map(String::from)
            .unwrap_or_else(|| id.to_string()),
        kind: chat_kind_from_peer(peer),
    }
}

/// Channel posts are broadcasts; service messages (joins, pins, title changes) are system events.
pub fn origin_of(is_post: bool, is_service: bool) -> MessageOrigin {
    if is_service {
        MessageOrigin::System
    } else if is_post {
        MessageOrigin::Broadcast
    } else {
        MessageOrigin::User
    }
}

/// Bot API ids are negative for basic groups, supergroups and channels.
/// Channels only ever produce posts, so a non-post in a negative id is a group message.
pub fn is_group_dialog(dialog_id: i64, origin: MessageOrigin) -> bool {
    dialog_id < 0 && origin != MessageOrigin::Broadcast
}

/// Raw fields of an inbound message, detached from grammers types.
#[derive(Debug, Clone, Default)]
pub struct RawIncoming {
    pub dialog_id: i64,
    pub message_id: i32,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub is_post: bool,
    pub is_service: bool,
    pub text: String,
}

pub fn incoming_from_raw(raw: RawIncoming) -> IncomingMessage {
    let origin = origin_of(raw.is_post, raw.is_service);
    IncomingMessage {
        chat_id: raw.dialog_id.to_string(),
        message_id: i64::from(raw.message_id),
        // Anonymous group admins post as the group itself.
        sender_id: raw.sender_id.unwrap_or(raw.dialog_id).to_string(),
        sender_name: raw.sender_name.unwrap_or_default(),
        is_group: is_group_dialog(raw.dialog_id, origin),
        origin,
        text: raw.text,
    }
}

/// Map a grammers update message to the router's view of it.
pub fn incoming_from_message(msg: &TgMessage) -> IncomingMessage {
    let sender = msg.sender();
    incoming_from_raw(RawIncoming {
        dialog_id: msg.peer_id().bot_api_dialog_id(),
        message_id: msg.id(),
        sender_id: sender.as_ref().map(|s| s.id().bot_api_dialog_id()),
        sender_name: sender.as_ref().and_then(|s| s.name().map(String::from)),
        is_post: msg.post(),
        is_service: msg.action().is_some(),
        text: msg.text().to_string(),
    })
}

/// Parse a chat id produced by this mapper back into a dialog id.
pub fn parse_chat_id(chat_id: &str) -> Option<i64> {
    chat_id.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(dialog_id: i64) -> RawIncoming {
        RawIncoming {
            dialog_id,
            message_id: 42,
            sender_id: Some(777),
            sender_name: Some("Alice".into()),
            text: "hello".into(),
            ..Default::default()
        }
    }

    #[test]
    fn supergroup_message_from_user() {
        let m = incoming_from_raw(raw(-1001234567890));
        assert_eq!(m.chat_id, "-1001234567890");
        assert_eq!(m.message_id, 42);
        assert_eq!(m.sender_id, "777");
        assert_eq!(m.origin, MessageOrigin::User);
        assert!(m.is_group);
    }

    #[test]
    fn private_chat_is_not_group() {
        assert!(!incoming_from_raw(raw(777)).is_group);
    }

    #[test]
    fn channel_post_is_broadcast() {
        let m = incoming_from_raw(RawIncoming {
            is_post: true,
            ..raw(-1009876543210)
        });
        assert_eq!(m.origin, MessageOrigin::Broadcast);
        assert!(!m.is_group);
    }

    #[test]
    fn service_message_is_system() {
        let m = incoming_from_raw(RawIncoming {
            is_service: true,
            text: String::new(),
            ..raw(-4001)
        });
        assert_eq!(m.origin, MessageOrigin::System);
    }

    #[test]
    fn anonymous_sender_falls_back_to_chat() {
        let m = incoming_from_raw(RawIncoming {
            sender_id: None,
            sender_name: None,
            ..raw(-4001)
        });
        assert_eq!(m.sender_id, "-4001");
        assert_eq!(m.sender_name, "");
    }

    #[test]
    fn chat_ids_round_trip() {
        assert_eq!(parse_chat_id("-1001234567890"), Some(-1001234567890));
        assert_eq!(parse_chat_id("not-a-chat"), None);
    }
}
