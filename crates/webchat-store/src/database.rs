//! History store connection management.
//!
//! The [`HistoryStore`] owns a [`rusqlite::Connection`] and guarantees that
//! the schema check has passed before any other operation. The connection
//! sits behind a mutex so one handle can be shared between the event side
//! and the history worker; callers never hold the lock across await points.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use webchat_shared::constants::{DATA_DIR, DB_NAME};

use crate::error::{Result, StoreError};
use crate::migrations;

/// Handle to the on-disk chat history.
pub struct HistoryStore {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl HistoryStore {
    /// Open (or create) the history database inside a game directory:
    /// `<game_dir>/web-chat/chat_messages.db`.
    pub fn open_in(game_dir: &Path) -> Result<Self> {
        Self::open(&game_dir.join(DATA_DIR).join(DB_NAME))
    }

    /// Open (or create) a history database at an explicit path.
    ///
    /// The parent directory is created when missing. Fails when the file
    /// cannot be opened or its schema version does not match this build.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening history store");

        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run_migrations(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: path.to_path_buf(),
        })
    }

    /// Filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded schema version.
    pub fn schema_version(&self) -> Result<u32> {
        self.with_conn(|conn| match migrations::read_state(conn)? {
            migrations::SchemaState::VersionRecorded(v) => Ok(v),
            migrations::SchemaState::Uninitialized => Ok(0),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Release the connection. Every later call fails with
    /// [`StoreError::Closed`], including a second `close`.
    pub fn close(&self) -> Result<()> {
        let conn = self.lock().take().ok_or(StoreError::Closed)?;
        tracing::info!(path = %self.path.display(), "closing history store");
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    /// Run `f` against the open connection.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        f(conn)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
