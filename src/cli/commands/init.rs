use crate::cli::parser::Cli;
use crate::config::{Config, DB_ENV_VAR};
use crate::db::DocumentStore;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::path::expand_tilde;
use std::env;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the document store schema, including pending migrations
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let custom = cli
        .db
        .clone()
        .or_else(|| env::var(DB_ENV_VAR).ok())
        .map(|db| expand_tilde(&db));
    let db_path = Config::init_all(custom.as_deref(), cli.test)?;

    info("Initializing tcxlog…");
    if !cli.test {
        info(format!("Config file : {}", Config::config_file().display()));
    }
    info(format!("Database    : {}", db_path.display()));

    let store = DocumentStore::open(&db_path, cfg.busy_timeout())?;
    if !store.is_new() {
        info("Existing document store found, schema is up to date");
    }

    if let Err(e) = ttlog(
        &store.conn,
        "init",
        &db_path.display().to_string(),
        "Database initialized",
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    store.close()?;
    success(format!("Database initialized at {}", db_path.display()));
    Ok(())
}
