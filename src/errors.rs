//! Unified application error type.
//! All modules (extractor, stores, aggregation, cli) return AppError so the
//! orchestrator can decide per file whether a failure is fatal.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Input
    // ---------------------------
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    // ---------------------------
    // Storage (StorageIOError class)
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Workbook error: {0}")]
    Sheet(String),

    // ---------------------------
    // Caller misuse
    // ---------------------------
    #[error("Invalid unique keys: {0}")]
    InvalidKeySpec(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True for failures of the underlying containers (open/save/connect).
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Io(_) | AppError::Db(_) | AppError::Sheet(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Sheet(e.to_string())
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(e: calamine::XlsxError) -> Self {
        AppError::Sheet(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
