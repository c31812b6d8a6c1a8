use crate::errors::AppResult;
use rusqlite::{Connection, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Create the `documents` table: one JSON body per row, grouped by collection.
///
/// `idx_documents_source` must use the exact expression emitted by the
/// upsert lookup, otherwise SQLite will not pick it.
fn ensure_documents_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            collection  TEXT NOT NULL,
            body        TEXT NOT NULL CHECK(json_valid(body)),
            updated_at  TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);

        CREATE INDEX IF NOT EXISTS idx_documents_source
            ON documents(collection, json_extract(body, '$."_source_file"'));
        "#,
    )?;
    Ok(())
}

/// Public entry point: create whatever part of the schema is missing.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;
    ensure_documents_table(conn)?;
    Ok(())
}
