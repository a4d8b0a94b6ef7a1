//! # webchat-shared
//!
//! Message model shared by the web-chat bridge and its history store: the
//! versioned JSON envelope sent to web clients, the builders that produce it
//! from host events or stored rows, and the identity scheme that partitions
//! chat history per world/server.

pub mod builder;
pub mod constants;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod translations;
pub mod types;

pub use error::BuildError;
pub use identity::{ClientContext, PlaySession, StaticContext};
pub use protocol::{ChatPayload, MessageBody, MessageType, WireMessage};
pub use types::{ConnectionState, HistoryRecord, RawTextEvent, ServerContext, TextEventKind};
