//! # webchat-bridge
//!
//! Glue between a running game client and the web-chat transport.
//!
//! The transport (WebSocket server, HTTP UI) lives outside this crate and
//! talks to a [`Bridge`]:
//! - **live events** become wire messages broadcast to every subscriber
//! - **chat history** is persisted by a background worker and replayed on
//!   request
//! - **configuration** comes from environment variables ([`BridgeConfig`])

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod notice;
pub mod worker;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use events::{ContextSink, HostEvent, HostState};
