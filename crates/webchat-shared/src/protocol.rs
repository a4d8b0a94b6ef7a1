use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionState, ServerContext};

/// Envelope sent to every web client.
///
/// On the wire the `type` tag and the `payload` sit next to the envelope
/// fields:
///
/// ```json
/// {"timestamp": 1700000000000, "server": {"name": "..", "identifier": ".."},
///  "type": "chatMessage", "minecraftVersion": "1.21", "payload": {..}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    /// Milliseconds since the Unix epoch (UTC), assigned once at construction.
    pub timestamp: i64,
    pub server: ServerContext,
    /// Version of the host client that produced the message.
    #[serde(rename = "minecraftVersion")]
    pub client_version: String,
    #[serde(flatten)]
    pub body: MessageBody,
}

/// Payload keyed by the message type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MessageBody {
    ChatMessage(ChatPayload),
    ServerConnectionState(ConnectionState),
}

/// Discriminant of [`MessageBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    ChatMessage,
    ServerConnectionState,
}

/// A chat line, live or replayed from history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatPayload {
    #[serde(rename = "history")]
    pub is_history: bool,
    /// Dedup key shared by the live delivery and every later replay.
    pub uuid: String,
    /// Opaque text-component tree.
    pub component: serde_json::Value,
    /// Localized strings for the translation keys used in `component`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

impl WireMessage {
    pub fn message_type(&self) -> MessageType {
        match self.body {
            MessageBody::ChatMessage(_) => MessageType::ChatMessage,
            MessageBody::ServerConnectionState(_) => MessageType::ServerConnectionState,
        }
    }

    pub fn chat_payload(&self) -> Option<&ChatPayload> {
        match &self.body {
            MessageBody::ChatMessage(payload) => Some(payload),
            MessageBody::ServerConnectionState(_) => None,
        }
    }

    pub fn connection_state(&self) -> Option<ConnectionState> {
        match self.body {
            MessageBody::ServerConnectionState(state) => Some(state),
            MessageBody::ChatMessage(_) => None,
        }
    }

    /// Serialize to the JSON text sent to web clients
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a JSON text produced by [`WireMessage::to_json`]
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
