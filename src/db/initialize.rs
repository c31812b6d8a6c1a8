use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Bring the schema of an open store up to date.
///
/// Returns `true` when the `documents` table did not exist yet, i.e. the
/// store was created by this call.
pub fn init_db(conn: &Connection) -> AppResult<bool> {
    let existed: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'documents')",
        [],
        |row| row.get(0),
    )?;
    run_pending_migrations(conn)?;
    Ok(!existed)
}
