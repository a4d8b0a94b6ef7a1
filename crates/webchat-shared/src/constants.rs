use uuid::Uuid;

/// Directory (relative to the game directory) holding the history database
pub const DATA_DIR: &str = "web-chat";

/// History database file name
pub const DB_NAME: &str = "chat_messages.db";

/// Display name of the sentinel context used when no world is attached
pub const DISCONNECTED_NAME: &str = "Disconnected";

/// Identifier of the sentinel context used when no world is attached
pub const DISCONNECTED_IDENTIFIER: &str = "disconnected";

/// Namespace for every name-based (v3) UUID minted by this crate.
/// Changing it re-partitions all stored history.
pub const IDENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x6d1f_3c2a_8b4e_4f7a_9c05_2e61_d8a3_b7f4);

/// Default HTTP port of the web interface
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default number of history messages sent to a freshly connected client
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Default capacity of the subscriber broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;
