//! # webchat-store
//!
//! Durable chat history for the web-chat bridge, backed by SQLite.
//!
//! Chat messages are appended as immutable rows partitioned by the server
//! identifier and read back newest first. The crate exposes a synchronous
//! [`HistoryStore`] handle; it performs blocking disk I/O and should be
//! driven from a worker rather than from the thread delivering live events.

pub mod database;
pub mod messages;
pub mod migrations;

mod error;

pub use database::HistoryStore;
pub use error::{Result, StoreError};
pub use migrations::{SchemaState, CURRENT_SCHEMA_VERSION};
