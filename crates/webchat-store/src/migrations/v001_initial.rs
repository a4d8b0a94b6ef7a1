//! v001 -- Initial schema creation.
//!
//! Creates the `messages` table with its per-server timestamp index and the
//! single-row `schema_version` table.

use rusqlite::Connection;

/// SQL executed when creating a fresh store.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Chat messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp         BIGINT NOT NULL,              -- ms since epoch, UTC
    server_id         TEXT NOT NULL,                -- name-based UUID of the world/server
    server_name       TEXT NOT NULL,
    message_id        TEXT NOT NULL,                -- dedup key, not unique
    message_json      TEXT NOT NULL,                -- compact text-component JSON
    minecraft_version TEXT
);

CREATE INDEX IF NOT EXISTS idx_server_id_timestamp
    ON messages(server_id, timestamp DESC);

-- ----------------------------------------------------------------
-- Schema version (single row)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

/// Apply the initial schema.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
