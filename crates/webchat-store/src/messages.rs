use rusqlite::params;
use webchat_shared::{HistoryRecord, WireMessage};

use crate::database::HistoryStore;
use crate::error::{Result, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, timestamp, server_id, server_name, message_id, message_json,
                                     minecraft_version
                              FROM messages";

impl HistoryStore {
    /// Append a chat message. Connection-state messages are rejected with
    /// [`StoreError::InvalidPayload`]. Repeated dedup keys are stored as
    /// separate rows.
    pub fn save(&self, message: &WireMessage) -> Result<()> {
        let payload = message.chat_payload().ok_or(StoreError::InvalidPayload)?;
        let message_json = serde_json::to_string(&payload.component)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (timestamp, server_id, server_name, message_id,
                                       message_json, minecraft_version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.timestamp,
                    message.server.identifier,
                    message.server.name,
                    payload.uuid,
                    message_json,
                    message.client_version,
                ],
            )?;
            Ok(())
        })
    }

    /// Most recent chat rows of a server, newest first, at most `limit`.
    ///
    /// History is best-effort: any failure is logged and yields an empty list.
    pub fn query(&self, server_id: &str, limit: u32) -> Vec<HistoryRecord> {
        self.try_query(server_id, None, limit)
            .unwrap_or_else(|e| {
                tracing::error!(server_id, error = %e, "failed to retrieve chat history");
                Vec::new()
            })
    }

    /// Like [`HistoryStore::query`], restricted to rows strictly older than
    /// `before` (ms since epoch). Used to page further back in history.
    pub fn query_before(&self, server_id: &str, before: i64, limit: u32) -> Vec<HistoryRecord> {
        self.try_query(server_id, Some(before), limit)
            .unwrap_or_else(|e| {
                tracing::error!(server_id, before, error = %e, "failed to retrieve chat history");
                Vec::new()
            })
    }

    /// Number of rows stored for a server.
    pub fn message_count(&self, server_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE server_id = ?1",
                params![server_id],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    fn try_query(
        &self,
        server_id: &str,
        before: Option<i64>,
        limit: u32,
    ) -> Result<Vec<HistoryRecord>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{SELECT_COLUMNS}
                 WHERE server_id = ?1 AND (?2 IS NULL OR timestamp < ?2)
                 ORDER BY timestamp DESC
                 LIMIT ?3"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params![server_id, before, limit], row_to_record)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        server_id: row.get(2)?,
        server_name: row.get(3)?,
        message_id: row.get(4)?,
        message_json: row.get(5)?,
        client_version: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
    })
}
