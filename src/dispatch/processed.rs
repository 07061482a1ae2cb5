//! Persistent record of messages that already triggered a transfer, using SQLite.
//!
//! A message id is claimed before its transfer is submitted and released again
//! only if the transfer certainly never reached the ledger, so a re-fetched
//! message or a retried callback can never pay out twice.

use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection};
use std::path::Path;

/// Manages the processed-message database.
pub struct ProcessedMessages {
    connection: Connection,
}

impl ProcessedMessages {
    /// Opens (or creates) the database file in `data_dir`.
    ///
    /// # Errors
    /// - If the data directory cannot be created
    /// - If the database file cannot be opened
    /// - If table creation fails
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let connection = Connection::open(data_dir.join("processed_messages.db"))?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS processed_messages (
                message_id TEXT PRIMARY KEY,
                signature TEXT,
                processed_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { connection })
    }

    /// Claims `message_id` for processing.
    ///
    /// Returns `false` if the id was claimed before.
    ///
    /// # Errors
    /// - If the insert fails for a reason other than a duplicate id
    pub fn claim(&self, message_id: &str) -> Result<bool> {
        let inserted = self.connection.execute(
            "INSERT OR IGNORE INTO processed_messages (message_id, processed_at) VALUES (?1, ?2)",
            params![message_id, Local::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    /// Records the signature of a submitted transfer.
    ///
    /// # Errors
    /// - If the update fails
    pub fn record_signature(&self, message_id: &str, signature: &str) -> Result<()> {
        self.connection.execute(
            "UPDATE processed_messages SET signature = ?2 WHERE message_id = ?1",
            params![message_id, signature],
        )?;
        Ok(())
    }

    /// Releases a claim whose transfer was never submitted.
    ///
    /// # Errors
    /// - If the delete fails
    pub fn release(&self, message_id: &str) -> Result<()> {
        self.connection.execute(
            "DELETE FROM processed_messages WHERE message_id = ?1 AND signature IS NULL",
            params![message_id],
        )?;
        Ok(())
    }
}

/// A message id with the signature its transfer produced.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ProcessedMessage {
    pub message_id: String,
    pub signature: Option<String>,
    pub processed_at: chrono::DateTime<Local>,
}

#[cfg(test)]
impl ProcessedMessages {
    /// An in-memory database; nothing survives the process.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Looks up a processed message.
    ///
    /// # Errors
    /// - If the query fails
    /// - If the stored timestamp cannot be parsed
    pub fn get(&self, message_id: &str) -> Result<Option<ProcessedMessage>> {
        use rusqlite::OptionalExtension;

        let mut statement = self.connection.prepare(
            "SELECT message_id, signature, processed_at FROM processed_messages WHERE message_id = ?1",
        )?;

        let entry = statement
            .query_row(params![message_id], |row| {
                let message_id = row.get::<_, String>(0)?;
                let signature = row.get::<_, Option<String>>(1)?;
                let timestamp_str = row.get::<_, String>(2)?;

                let processed_at = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(ProcessedMessage {
                    message_id,
                    signature,
                    processed_at,
                })
            })
            .optional()?;

        Ok(entry)
    }
}

