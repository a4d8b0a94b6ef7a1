//! Bridge configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the bridge can start with zero
//! configuration.

use std::path::PathBuf;

use directories::ProjectDirs;
use webchat_shared::constants::{
    DEFAULT_BROADCAST_CAPACITY, DEFAULT_HISTORY_LIMIT, DEFAULT_HTTP_PORT,
};

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Game directory; history lives in `<game_dir>/web-chat/`.
    /// Env: `WEBCHAT_GAME_DIR`
    /// Default: platform data directory, or `.` when there is none.
    pub game_dir: PathBuf,

    /// Port of the web interface, advertised to the player on join.
    /// Env: `WEBCHAT_HTTP_PORT`
    /// Default: `8080`
    pub http_port: u16,

    /// Whether chat messages are persisted.
    /// Env: `WEBCHAT_HISTORY` (true/false)
    /// Default: `true`
    pub history_enabled: bool,

    /// Number of history messages sent to a newly connected web client.
    /// Env: `WEBCHAT_HISTORY_LIMIT`
    /// Default: `50`
    pub history_limit: u32,

    /// Capacity of the subscriber broadcast channel. Slow subscribers past
    /// this many messages behind start losing messages.
    /// Env: `WEBCHAT_BROADCAST_CAPACITY`
    /// Default: `256`
    pub broadcast_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            game_dir: default_game_dir(),
            http_port: DEFAULT_HTTP_PORT,
            history_enabled: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("WEBCHAT_GAME_DIR") {
            if !dir.is_empty() {
                config.game_dir = PathBuf::from(dir);
            }
        }

        if let Some(val) = lookup("WEBCHAT_HTTP_PORT") {
            match val.parse::<u16>() {
                Ok(port) if port != 0 => config.http_port = port,
                _ => {
                    tracing::warn!(value = %val, "Invalid WEBCHAT_HTTP_PORT, using default");
                }
            }
        }

        if let Some(val) = lookup("WEBCHAT_HISTORY") {
            config.history_enabled = val != "false" && val != "0";
        }

        if let Some(val) = lookup("WEBCHAT_HISTORY_LIMIT") {
            match val.parse::<u32>() {
                Ok(n) => config.history_limit = n,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid WEBCHAT_HISTORY_LIMIT, using default");
                }
            }
        }

        if let Some(val) = lookup("WEBCHAT_BROADCAST_CAPACITY") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.broadcast_capacity = n,
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid WEBCHAT_BROADCAST_CAPACITY, using default"
                    );
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn default_game_dir() -> PathBuf {
    ProjectDirs::from("dev", "creesch", "web-chat")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
