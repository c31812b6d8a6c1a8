use serde::Serialize;

/// Per-file totals recomputed on every aggregation read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub source: String,
    /// Date-like substring of the filename, or the filename itself.
    pub date: String,
    pub total_distance_m: f64,
    pub total_distance_formatted: String,
    pub total_time_s: f64,
    pub total_time_formatted: String,
}
