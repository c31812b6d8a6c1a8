pub mod config;
pub mod detail;
pub mod ingest;
pub mod init;
pub mod log;
pub mod summary;
