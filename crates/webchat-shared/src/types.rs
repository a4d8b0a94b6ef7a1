use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DISCONNECTED_IDENTIFIER, DISCONNECTED_NAME, IDENTITY_NAMESPACE};

/// The world or server a player is currently playing on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ServerContext {
    pub name: String,
    pub identifier: String,
}

impl ServerContext {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }

    /// Sentinel returned when no world is attached.
    pub fn disconnected() -> Self {
        Self::new(DISCONNECTED_NAME, DISCONNECTED_IDENTIFIER)
    }

    pub fn is_disconnected(&self) -> bool {
        self.identifier == DISCONNECTED_IDENTIFIER
    }
}

impl std::fmt::Display for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.identifier)
    }
}

/// Connection lifecycle states, named after the host's play-connection events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Init,
    Join,
    Disconnect,
}

/// Where a text event came from. Both kinds are broadcast and persisted the same way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TextEventKind {
    /// Chat sent by a player
    Chat,
    /// System/game text (joins, leaves, deaths, ...)
    Game,
}

/// A rich-text event as delivered by the host, already converted to the
/// host's JSON text-component tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTextEvent {
    pub kind: TextEventKind,
    pub component: serde_json::Value,
}

impl RawTextEvent {
    pub fn chat(component: serde_json::Value) -> Self {
        Self {
            kind: TextEventKind::Chat,
            component,
        }
    }

    pub fn game(component: serde_json::Value) -> Self {
        Self {
            kind: TextEventKind::Game,
            component,
        }
    }
}

/// A persisted chat row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Auto-increment row id.
    pub id: i64,
    /// Milliseconds since the Unix epoch (UTC).
    pub timestamp: i64,
    pub server_id: String,
    pub server_name: String,
    /// Dedup key minted when the message was first received.
    pub message_id: String,
    /// Compact JSON of the chat component.
    pub message_json: String,
    pub client_version: String,
}

/// Derive a deterministic name-based UUID from a seed string.
pub fn name_uuid(seed: &str) -> Uuid {
    Uuid::new_v3(&IDENTITY_NAMESPACE, seed.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_uuid_deterministic() {
        assert_eq!(name_uuid("localhost:25565"), name_uuid("localhost:25565"));
        assert_ne!(name_uuid("localhost:25565"), name_uuid("localhost:25566"));
        assert_eq!(name_uuid("a").get_version_num(), 3);
    }

    #[test]
    fn test_connection_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&ConnectionState::Disconnect).unwrap(),
            "\"disconnect\""
        );
        let state: ConnectionState = serde_json::from_str("\"init\"").unwrap();
        assert_eq!(state, ConnectionState::Init);
    }

    #[test]
    fn test_disconnected_sentinel() {
        let ctx = ServerContext::disconnected();
        assert_eq!(ctx.name, "Disconnected");
        assert_eq!(ctx.identifier, "disconnected");
        assert!(ctx.is_disconnected());
    }
}
