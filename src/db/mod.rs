pub mod documents;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;

pub use documents::{Document, UniqueKeys, UpsertStats, sanitize_document};
pub use pool::DocumentStore;
