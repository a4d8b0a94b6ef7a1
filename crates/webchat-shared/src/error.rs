use thiserror::Error;

/// Errors raised while turning a host event or a stored row into a wire message.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot build chat message: no world attached to the client")]
    NoWorld,

    #[error("Invalid chat component: {0}")]
    InvalidComponent(#[from] serde_json::Error),
}
