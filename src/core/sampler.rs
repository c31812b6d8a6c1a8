//! Detail-table preparation for display: row sampling, formatting and
//! run-length merge spans for cell merging.

use crate::core::metrics::accumulated_altitude_deltas;
use crate::models::{PersistedRecord, TrackpointRecord};
use crate::utils::formatting::{format_altitude, format_distance, format_pace, format_seconds};
use serde::Serialize;
use std::collections::BTreeMap;

/// Keep one detail row every this many rows.
pub const DEFAULT_SAMPLE_INTERVAL: usize = 60;

/// Indices retained when keeping every `stride`-th row of `len` rows.
///
/// Index 0 is always kept; the last row is not forced in, so 120 rows with
/// stride 60 give `[0, 60]`. A zero stride keeps everything.
pub fn sample_indices(len: usize, stride: usize) -> Vec<usize> {
    let stride = stride.max(1);
    let mut kept = Vec::new();
    let mut last: Option<usize> = None;

    for i in 0..len {
        match last {
            Some(prev) if i - prev < stride => {}
            _ => {
                kept.push(i);
                last = Some(i);
            }
        }
    }
    kept
}

/// Merge annotation of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeCell {
    pub show: bool,
    /// Rows spanned by this cell; 0 for hidden cells.
    #[serde(skip_serializing_if = "is_zero")]
    pub rowspan: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Run-length encoding of equal consecutive values.
///
/// `[1, 1, 2]` → shown/2, hidden, shown/1.
pub fn merge_spans<T: PartialEq>(values: &[T]) -> Vec<MergeCell> {
    let mut cells = Vec::with_capacity(values.len());
    let mut start = 0;

    while start < values.len() {
        let mut end = start + 1;
        while end < values.len() && values[end] == values[start] {
            end += 1;
        }
        cells.push(MergeCell {
            show: true,
            rowspan: end - start,
        });
        cells.extend((start + 1..end).map(|_| MergeCell {
            show: false,
            rowspan: 0,
        }));
        start = end;
    }
    cells
}

/// Columns whose equal consecutive cells are merged when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MergeColumn {
    LapNumber,
    LapStartTime,
    #[serde(rename = "LapTotalTime_s")]
    LapTotalTime,
    #[serde(rename = "LapDistance_m")]
    LapDistance,
    #[serde(rename = "Pace_min_per_km")]
    Pace,
    #[serde(rename = "_source_file")]
    SourceFile,
}

impl MergeColumn {
    pub const ALL: [MergeColumn; 6] = [
        MergeColumn::LapNumber,
        MergeColumn::LapStartTime,
        MergeColumn::LapTotalTime,
        MergeColumn::LapDistance,
        MergeColumn::Pace,
        MergeColumn::SourceFile,
    ];

    /// Comparable cell value of this column for `row`.
    fn key(&self, row: &DisplayRow) -> String {
        let lap = &row.point.lap;
        match self {
            MergeColumn::LapNumber => lap.lap_number.to_string(),
            MergeColumn::LapStartTime => lap.start_time.clone().unwrap_or_default(),
            MergeColumn::LapTotalTime => format!("{:?}", lap.total_time_s),
            MergeColumn::LapDistance => format!("{:?}", lap.distance_m),
            MergeColumn::Pace => format!("{:?}", lap.pace_min_per_km),
            MergeColumn::SourceFile => row.source_file.clone(),
        }
    }
}

/// One retained, pre-formatted detail row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    #[serde(flatten)]
    pub point: TrackpointRecord,
    #[serde(rename = "_source_file")]
    pub source_file: String,
    /// Net altitude change since the first sample of the lap.
    #[serde(rename = "AltitudeDelta_m")]
    pub altitude_delta_m: Option<f64>,

    #[serde(rename = "LapTotalTime_formatted")]
    pub lap_total_time_formatted: String,
    #[serde(rename = "LapDistance_formatted")]
    pub lap_distance_formatted: String,
    #[serde(rename = "Pace_formatted")]
    pub pace_formatted: String,
    #[serde(rename = "Distance_formatted")]
    pub distance_formatted: String,
    #[serde(rename = "Altitude_formatted")]
    pub altitude_formatted: String,
    #[serde(rename = "AltitudeDelta_formatted")]
    pub altitude_delta_formatted: String,

    #[serde(rename = "_merge_info")]
    pub merge_info: BTreeMap<MergeColumn, MergeCell>,
}

impl DisplayRow {
    fn new(record: PersistedRecord<TrackpointRecord>, altitude_delta_m: Option<f64>) -> Self {
        let point = record.record;
        Self {
            lap_total_time_formatted: format_seconds(point.lap.total_time_s),
            lap_distance_formatted: format_distance(point.lap.distance_m),
            pace_formatted: format_pace(point.lap.pace_min_per_km),
            distance_formatted: format_distance(point.distance_m),
            altitude_formatted: format_altitude(point.altitude_m),
            altitude_delta_formatted: format_altitude(altitude_delta_m),
            source_file: record.source_file,
            altitude_delta_m,
            point,
            merge_info: BTreeMap::new(),
        }
    }

    /// Whether the cell of `column` is rendered (false when merged upward).
    pub fn shows(&self, column: MergeColumn) -> bool {
        self.merge_info.get(&column).is_none_or(|c| c.show)
    }
}

/// Build the display table of one source file.
///
/// Rows are ordered by time (stable), the per-lap accumulated altitude delta
/// is computed over *all* rows, then rows are sampled and the merge spans are
/// computed over the sampled rows only.
pub fn build_display_rows(
    mut records: Vec<PersistedRecord<TrackpointRecord>>,
    stride: usize,
) -> Vec<DisplayRow> {
    records.sort_by(|a, b| a.record.time.cmp(&b.record.time));

    let deltas = lap_altitude_deltas(&records);
    let keep = sample_indices(records.len(), stride);

    let mut rows: Vec<DisplayRow> = Vec::with_capacity(keep.len());
    let mut keep_iter = keep.into_iter().peekable();
    for (i, (record, delta)) in records.into_iter().zip(deltas).enumerate() {
        if keep_iter.peek() == Some(&i) {
            keep_iter.next();
            rows.push(DisplayRow::new(record, delta));
        }
    }

    for column in MergeColumn::ALL {
        let keys: Vec<String> = rows.iter().map(|r| column.key(r)).collect();
        for (row, cell) in rows.iter_mut().zip(merge_spans(&keys)) {
            row.merge_info.insert(column, cell);
        }
    }

    rows
}

/// Accumulated altitude delta for every record, restarting at each lap.
fn lap_altitude_deltas(records: &[PersistedRecord<TrackpointRecord>]) -> Vec<Option<f64>> {
    let mut by_lap: BTreeMap<u32, Vec<(usize, f64)>> = BTreeMap::new();
    for (i, r) in records.iter().enumerate() {
        if let Some(alt) = r.record.altitude_m {
            by_lap.entry(r.record.lap.lap_number).or_default().push((i, alt));
        }
    }

    let mut out = vec![None; records.len()];
    for samples in by_lap.values() {
        let alts: Vec<f64> = samples.iter().map(|(_, a)| *a).collect();
        for ((i, _), delta) in samples.iter().zip(accumulated_altitude_deltas(&alts)) {
            out[*i] = Some(delta);
        }
    }
    out
}
