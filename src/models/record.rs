use super::{LapRecord, TrackpointRecord};
use crate::db::documents::Document;
use crate::errors::{AppError, AppResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field carrying the sanitized source filename on every persisted record.
pub const SOURCE_FILE_FIELD: &str = "_source_file";

/// The two record granularities produced by ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Summary,
    Detail,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Summary => "summary",
            RecordKind::Detail => "detail",
        }
    }

    /// Document-store collection holding this kind of record.
    pub fn collection(&self) -> &'static str {
        self.as_str()
    }

    /// Sheet name inside the workbook: `{date}_{summary|detail}`.
    pub fn sheet_name(&self, date: &str) -> String {
        format!("{date}_{}", self.as_str())
    }

    /// Fields identifying "the same" record across repeated ingestion runs.
    /// The source file field is appended by the orchestrator.
    pub fn unique_keys(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Summary => &[
                "LapStartTime",
                "LapNumber",
                "LapTotalTime_s",
                "LapDistance_m",
                "Pace_min_per_km",
            ],
            RecordKind::Detail => &["LapStartTime", "LapNumber", "Time"],
        }
    }
}

/// Which branches of the ingestion run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Summary,
    #[value(alias = "detailed")]
    #[serde(alias = "detailed")]
    Detail,
    #[default]
    Both,
}

impl Mode {
    pub fn kinds(&self) -> &'static [RecordKind] {
        match self {
            Mode::Summary => &[RecordKind::Summary],
            Mode::Detail => &[RecordKind::Detail],
            Mode::Both => &[RecordKind::Summary, RecordKind::Detail],
        }
    }
}

/// A record after ingestion, tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord<T> {
    #[serde(flatten)]
    pub record: T,

    #[serde(rename = "_source_file", default = "unknown_source")]
    pub source_file: String,
}

fn unknown_source() -> String {
    "Unknown".to_string()
}

impl<T: Serialize> PersistedRecord<T> {
    pub fn new(record: T, source_file: impl Into<String>) -> Self {
        Self {
            record,
            source_file: source_file.into(),
        }
    }

    pub fn to_document(&self) -> AppResult<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Other(format!(
                "record serialized to a non-object value: {other}"
            ))),
        }
    }
}

/// Records of one kind extracted from one file, ready for the sinks.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Summary(Vec<LapRecord>),
    Detail(Vec<TrackpointRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBatch::Summary(_) => RecordKind::Summary,
            RecordBatch::Detail(_) => RecordKind::Detail,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Summary(laps) => laps.len(),
            RecordBatch::Detail(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten every record into a document carrying `source_file`.
    pub fn to_documents(&self, source_file: &str) -> AppResult<Vec<Document>> {
        match self {
            RecordBatch::Summary(laps) => laps
                .iter()
                .map(|lap| PersistedRecord::new(lap, source_file).to_document())
                .collect(),
            RecordBatch::Detail(points) => points
                .iter()
                .map(|tp| PersistedRecord::new(tp, source_file).to_document())
                .collect(),
        }
    }
}
