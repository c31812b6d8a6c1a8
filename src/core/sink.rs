//! The one capability the orchestrator needs from a persistence backend.

use crate::db::{DocumentStore, UniqueKeys};
use crate::errors::AppResult;
use crate::export::{SheetStore, batch_to_table};
use crate::models::record::SOURCE_FILE_FIELD;
use crate::models::{RecordBatch, RecordKind};

/// Identity of the file a batch came from.
#[derive(Debug, Clone, Copy)]
pub struct SinkContext<'a> {
    /// Best-effort workout date, `UnknownDate` when missing.
    pub date: &'a str,
    /// Sanitized base filename.
    pub source_file: &'a str,
}

/// A backend that stores a batch with replace-on-conflict semantics.
pub trait RecordSink {
    fn name(&self) -> &'static str;

    /// Where a batch of `kind` ends up (sheet or collection name).
    fn target(&self, kind: RecordKind, ctx: &SinkContext<'_>) -> String;

    /// Persist `batch`; returns the number of records written.
    fn persist(&mut self, batch: &RecordBatch, ctx: &SinkContext<'_>) -> AppResult<usize>;
}

impl RecordSink for SheetStore {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn target(&self, kind: RecordKind, ctx: &SinkContext<'_>) -> String {
        kind.sheet_name(ctx.date)
    }

    fn persist(&mut self, batch: &RecordBatch, ctx: &SinkContext<'_>) -> AppResult<usize> {
        let sheet = self.target(batch.kind(), ctx);
        self.replace_sheet(&batch_to_table(batch), &sheet)?;
        Ok(batch.len())
    }
}

impl RecordSink for DocumentStore {
    fn name(&self) -> &'static str {
        "document store"
    }

    fn target(&self, kind: RecordKind, _ctx: &SinkContext<'_>) -> String {
        kind.collection().to_string()
    }

    fn persist(&mut self, batch: &RecordBatch, ctx: &SinkContext<'_>) -> AppResult<usize> {
        let kind = batch.kind();
        let keys = UniqueKeys::new(kind.unique_keys().iter().copied())?.with(SOURCE_FILE_FIELD)?;
        let documents = batch.to_documents(ctx.source_file)?;
        let stats = self.upsert(kind.collection(), &documents, &keys)?;
        Ok(stats.written())
    }
}
