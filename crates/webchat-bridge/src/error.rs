use thiserror::Error;
use webchat_shared::BuildError;

/// Errors surfaced while handling a host event.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Message build error: {0}")]
    Build(#[from] BuildError),

    #[error("Invalid host event: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}
