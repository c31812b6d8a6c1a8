// src/export/model.rs

use crate::models::{LapRecord, RecordBatch, TrackpointRecord};

/// Valore di una cella, sia scritta da noi sia riletta dal workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Testo mostrato, usato anche per la larghezza delle colonne.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }
}

impl From<Option<&str>> for CellValue {
    fn from(v: Option<&str>) -> Self {
        v.map(|s| CellValue::Text(s.to_string()))
            .unwrap_or(CellValue::Empty)
    }
}

/// A header row plus data rows, written as one worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }
}

/// Header per il foglio summary.
pub(crate) fn summary_headers() -> Vec<&'static str> {
    vec![
        "LapNumber",
        "LapStartTime",
        "LapTotalTime_s",
        "LapDistance_m",
        "Pace_min_per_km",
    ]
}

/// Header per il foglio detail.
pub(crate) fn detail_headers() -> Vec<&'static str> {
    vec![
        "LapNumber",
        "LapStartTime",
        "LapTotalTime_s",
        "LapDistance_m",
        "Pace_min_per_km",
        "Time",
        "Latitude",
        "Longitude",
        "Altitude_m",
        "Distance_m",
    ]
}

fn lap_cells(lap: &LapRecord) -> Vec<CellValue> {
    vec![
        CellValue::Number(f64::from(lap.lap_number)),
        lap.start_time.as_deref().into(),
        lap.total_time_s.into(),
        lap.distance_m.into(),
        lap.pace_min_per_km.into(),
    ]
}

fn trackpoint_cells(tp: &TrackpointRecord) -> Vec<CellValue> {
    let mut cells = lap_cells(&tp.lap);
    cells.extend([
        tp.time.as_deref().into(),
        tp.latitude.into(),
        tp.longitude.into(),
        tp.altitude_m.into(),
        tp.distance_m.into(),
    ]);
    cells
}

/// Convert a batch into the sheet layout (no `_source_file` column).
pub fn batch_to_table(batch: &RecordBatch) -> Table {
    match batch {
        RecordBatch::Summary(laps) => {
            let mut table = Table::new(&summary_headers());
            for lap in laps {
                table.push_row(lap_cells(lap));
            }
            table
        }
        RecordBatch::Detail(points) => {
            let mut table = Table::new(&detail_headers());
            for tp in points {
                table.push_row(trackpoint_cells(tp));
            }
            table
        }
    }
}
