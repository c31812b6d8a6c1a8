//! Document store connection handle.

use crate::db::initialize::init_db;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Single shared handle to the SQLite-backed document store.
///
/// Opened once per run and passed explicitly to ingestion and aggregation;
/// call [`DocumentStore::close`] to release it.
pub struct DocumentStore {
    pub conn: Connection,
    created: bool,
}

impl DocumentStore {
    /// Open (creating if needed) the store at `path` and run migrations.
    ///
    /// `busy_timeout` bounds how long the connection waits for a lock held
    /// by another process; individual writes have no other timeout.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> AppResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(busy_timeout)?;
        let created = init_db(&conn)?;
        Ok(Self { conn, created })
    }

    /// In-memory store, mostly for tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        let created = init_db(&conn)?;
        Ok(Self { conn, created })
    }

    /// Whether opening this handle created the schema.
    pub fn is_new(&self) -> bool {
        self.created
    }

    /// Explicitly release the connection, surfacing close errors.
    pub fn close(self) -> AppResult<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
