use thiserror::Error;

/// Errors produced by the history store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The database was written by a newer version and uses an unknown layout.
    #[error("Database schema version {stored} is newer than supported version {supported}")]
    SchemaTooNew { stored: u32, supported: u32 },

    /// The database predates the current layout and no migration exists.
    #[error("Database schema version {stored} is older than supported version {supported}")]
    SchemaTooOld { stored: u32, supported: u32 },

    /// Only chat messages are persisted.
    #[error("Message payload is not a chat payload")]
    InvalidPayload,

    /// Component could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was closed.
    #[error("History store is closed")]
    Closed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
