//! SQLite-backed aggregate storage.
//!
//! One row per aggregate:
//! - `history`: finished sessions, most recent first
//! - `templates`: saved workout templates
//! - `config`: the last authored workout config
//! - `active_session`: snapshot of an in-flight workout

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, AggregateStore};
use crate::error::StorageError;

/// SQLite database holding every persisted aggregate.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/fittimer/fittimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("fittimer.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS aggregates (
                name       TEXT PRIMARY KEY,
                data       BLOB NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl AggregateStore for SqliteStore {
    fn load_aggregate(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM aggregates WHERE name = ?1",
                params![name],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(data)
    }

    fn save_aggregate(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO aggregates (name, data, updated_at) VALUES (?1, ?2, ?3)",
            params![name, bytes, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete_aggregate(&self, name: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM aggregates WHERE name = ?1", params![name])?;
        Ok(())
    }
}
