//! Construction of [`WireMessage`]s.
//!
//! Live messages and replayed history go through separate functions: the
//! dedup key of a chat message is minted once, when it is first received,
//! and history replays carry the stored key instead of deriving a new one.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::BuildError;
use crate::identity::{self, ClientContext};
use crate::protocol::{ChatPayload, MessageBody, WireMessage};
use crate::translations::extract_translations;
use crate::types::{name_uuid, ConnectionState, HistoryRecord, RawTextEvent, ServerContext};

/// Current time in milliseconds since the Unix epoch (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Dedup key of a live chat message: a name-based UUID over the timestamp
/// followed by the compact component JSON.
pub fn message_uuid(timestamp: i64, component_json: &str) -> String {
    name_uuid(&format!("{timestamp}{component_json}")).to_string()
}

/// Build a live chat message stamped with the current time.
pub fn build_live<C: ClientContext + ?Sized>(
    event: &RawTextEvent,
    ctx: &C,
) -> Result<WireMessage, BuildError> {
    build_live_at(event, ctx, now_millis())
}

/// Build a live chat message with an explicit timestamp.
pub fn build_live_at<C: ClientContext + ?Sized>(
    event: &RawTextEvent,
    ctx: &C,
    timestamp: i64,
) -> Result<WireMessage, BuildError> {
    if !ctx.world_attached() {
        return Err(BuildError::NoWorld);
    }

    let component_json = serde_json::to_string(&event.component)?;
    let uuid = message_uuid(timestamp, &component_json);

    Ok(WireMessage {
        timestamp,
        server: identity::resolve(ctx),
        client_version: ctx.game_version(),
        body: MessageBody::ChatMessage(ChatPayload {
            is_history: false,
            uuid,
            component: event.component.clone(),
            translations: extract_translations(&event.component, ctx),
        }),
    })
}

/// Rebuild a chat message from a stored row. Nothing is recomputed: the
/// timestamp, dedup key and server come straight from the record.
pub fn build_historic(record: &HistoryRecord) -> Result<WireMessage, BuildError> {
    let component: serde_json::Value = serde_json::from_str(&record.message_json)?;

    Ok(WireMessage {
        timestamp: record.timestamp,
        server: ServerContext::new(record.server_name.clone(), record.server_id.clone()),
        client_version: record.client_version.clone(),
        body: MessageBody::ChatMessage(ChatPayload {
            is_history: true,
            uuid: record.message_id.clone(),
            component,
            translations: BTreeMap::new(),
        }),
    })
}

/// Build a connection-state message stamped with the current time.
pub fn build_connection_state<C: ClientContext + ?Sized>(
    state: ConnectionState,
    ctx: &C,
) -> WireMessage {
    build_connection_state_at(state, ctx, now_millis())
}

pub fn build_connection_state_at<C: ClientContext + ?Sized>(
    state: ConnectionState,
    ctx: &C,
    timestamp: i64,
) -> WireMessage {
    WireMessage {
        timestamp,
        server: identity::resolve(ctx),
        client_version: ctx.game_version(),
        body: MessageBody::ServerConnectionState(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{PlaySession, StaticContext};
    use crate::protocol::MessageType;
    use serde_json::json;

    fn remote_ctx() -> StaticContext {
        StaticContext {
            world_attached: true,
            session: Some(PlaySession::Remote {
                name: Some("Friends".to_string()),
                address: "mc.example.org".to_string(),
            }),
            game_version: "1.21.1".to_string(),
            ..Default::default()
        }
    }

    fn record() -> HistoryRecord {
        HistoryRecord {
            id: 7,
            timestamp: 1_234,
            server_id: "abc".to_string(),
            server_name: "Friends".to_string(),
            message_id: "stored-uuid".to_string(),
            message_json: r#"{"text":"old news"}"#.to_string(),
            client_version: "1.20.4".to_string(),
        }
    }

    #[test]
    fn test_live_requires_world() {
        let mut ctx = remote_ctx();
        ctx.world_attached = false;
        let event = RawTextEvent::chat(json!({"text": "hi"}));
        assert!(matches!(build_live(&event, &ctx), Err(BuildError::NoWorld)));
    }

    #[test]
    fn test_live_message() {
        let ctx = remote_ctx();
        let event = RawTextEvent::chat(json!({"text": "hi"}));
        let msg = build_live_at(&event, &ctx, 42).unwrap();

        assert_eq!(msg.timestamp, 42);
        assert_eq!(msg.server, identity::resolve(&ctx));
        assert_eq!(msg.client_version, "1.21.1");
        assert_eq!(msg.message_type(), MessageType::ChatMessage);

        let payload = msg.chat_payload().unwrap();
        assert!(!payload.is_history);
        assert_eq!(payload.component, json!({"text": "hi"}));
        assert_eq!(payload.uuid, message_uuid(42, r#"{"text":"hi"}"#));
    }

    #[test]
    fn test_live_uuid_deterministic() {
        let ctx = remote_ctx();
        let event = RawTextEvent::game(json!({"text": "Alex joined"}));

        let a = build_live_at(&event, &ctx, 100).unwrap();
        let b = build_live_at(&event, &ctx, 100).unwrap();
        let later = build_live_at(&event, &ctx, 101).unwrap();
        let other = build_live_at(&RawTextEvent::game(json!({"text": "Alex left"})), &ctx, 100)
            .unwrap();

        let uuid = |m: &WireMessage| m.chat_payload().unwrap().uuid.clone();
        assert_eq!(uuid(&a), uuid(&b));
        assert_ne!(uuid(&a), uuid(&later));
        assert_ne!(uuid(&a), uuid(&other));
    }

    #[test]
    fn test_live_translations() {
        let mut ctx = remote_ctx();
        ctx.translations
            .insert("multiplayer.player.left".to_string(), "%s left the game".to_string());
        let event = RawTextEvent::game(json!({
            "translate": "multiplayer.player.left",
            "with": [{"text": "Alex"}]
        }));

        let msg = build_live_at(&event, &ctx, 1).unwrap();
        let payload = msg.chat_payload().unwrap();
        assert_eq!(payload.translations["multiplayer.player.left"], "%s left the game");
    }

    #[test]
    fn test_historic_message() {
        let record = record();
        let msg = build_historic(&record).unwrap();

        assert_eq!(msg.timestamp, record.timestamp);
        assert_eq!(msg.server, ServerContext::new("Friends", "abc"));
        assert_eq!(msg.client_version, "1.20.4");

        let payload = msg.chat_payload().unwrap();
        assert!(payload.is_history);
        assert_eq!(payload.uuid, record.message_id);
        assert_eq!(payload.component, json!({"text": "old news"}));
    }

    #[test]
    fn test_historic_rejects_malformed_json() {
        let mut record = record();
        record.message_json = "{not json".to_string();
        assert!(matches!(
            build_historic(&record),
            Err(BuildError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_connection_state_message() {
        let ctx = remote_ctx();
        let msg = build_connection_state_at(ConnectionState::Join, &ctx, 9);

        assert_eq!(msg.timestamp, 9);
        assert_eq!(msg.connection_state(), Some(ConnectionState::Join));
        assert_eq!(msg.server.name, "Friends");
    }

    #[test]
    fn test_connection_state_without_world() {
        let ctx = StaticContext::default();
        let msg = build_connection_state(ConnectionState::Disconnect, &ctx);
        assert!(msg.server.is_disconnected());
        assert!(msg.timestamp > 0);
    }
}
