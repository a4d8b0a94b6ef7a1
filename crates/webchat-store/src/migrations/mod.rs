//! Schema version check.
//!
//! Runs once per [`HistoryStore::open`](crate::HistoryStore::open). The
//! stored version is read before anything is created, so a database written
//! by a newer build is rejected without being touched:
//!
//! - no version recorded: create the schema and record [`CURRENT_SCHEMA_VERSION`]
//! - stored == current: accept as-is
//! - stored > current: [`StoreError::SchemaTooNew`]
//! - stored < current: [`StoreError::SchemaTooOld`]; there is no migration path

pub mod v001_initial;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// Current schema version. Bump this and add a new module whenever the
/// schema changes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Schema state of an opened database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Uninitialized,
    VersionRecorded(u32),
}

/// Read the recorded version without creating anything.
pub fn read_state(conn: &Connection) -> Result<SchemaState> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS (
             SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'
         )",
        [],
        |row| row.get(0),
    )?;

    if !has_table {
        return Ok(SchemaState::Uninitialized);
    }

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(match version {
        Some(v) => SchemaState::VersionRecorded(v),
        None => SchemaState::Uninitialized,
    })
}

/// Bring the database to [`SchemaState::VersionRecorded`] with the current
/// version, or refuse to open it.
pub fn run_migrations(conn: &mut Connection) -> Result<SchemaState> {
    let state = read_state(conn)?;

    tracing::info!(
        ?state,
        target_version = CURRENT_SCHEMA_VERSION,
        "checking history schema"
    );

    match state {
        SchemaState::Uninitialized => {
            tracing::info!("applying migration v001_initial");
            let tx = conn.transaction()?;
            v001_initial::up(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![CURRENT_SCHEMA_VERSION],
            )?;
            tx.commit()?;
            Ok(SchemaState::VersionRecorded(CURRENT_SCHEMA_VERSION))
        }
        SchemaState::VersionRecorded(stored) if stored == CURRENT_SCHEMA_VERSION => Ok(state),
        SchemaState::VersionRecorded(stored) if stored > CURRENT_SCHEMA_VERSION => {
            tracing::error!(
                stored,
                supported = CURRENT_SCHEMA_VERSION,
                "history schema is newer than supported"
            );
            Err(StoreError::SchemaTooNew {
                stored,
                supported: CURRENT_SCHEMA_VERSION,
            })
        }
        SchemaState::VersionRecorded(stored) => {
            tracing::error!(
                stored,
                supported = CURRENT_SCHEMA_VERSION,
                "history schema is older than supported"
            );
            Err(StoreError::SchemaTooOld {
                stored,
                supported: CURRENT_SCHEMA_VERSION,
            })
        }
    }
}
