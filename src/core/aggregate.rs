//! Aggregation over persisted records: per-file totals, per-lap altitude
//! deltas, record holders and the sampled detail view.
//!
//! Everything is recomputed from the store on each call.

use crate::core::metrics::{AsNumber, altitude_delta};
use crate::core::sampler::{DEFAULT_SAMPLE_INTERVAL, DisplayRow, build_display_rows};
use crate::db::{Document, DocumentStore};
use crate::errors::AppResult;
use crate::models::{FileSummary, LapRecord, PersistedRecord, RecordKind, TrackpointRecord};
use crate::utils::date::extract_date_from_filename;
use crate::utils::formatting::{format_altitude, format_distance, format_seconds};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Laps shorter than this are not considered for fastest/slowest
/// ("1 km, allowing for GPS rounding").
pub const MIN_VALID_LAP_DISTANCE: f64 = 990.0;

/// A stored summary lap, with display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapView {
    #[serde(flatten)]
    pub lap: LapRecord,
    #[serde(rename = "_source_file")]
    pub source_file: String,
    #[serde(rename = "LapTotalTime_formatted")]
    pub total_time_formatted: String,
    #[serde(rename = "LapDistance_formatted")]
    pub distance_formatted: String,
    /// Filled by [`summarize_files`]; 0 when the lap has no altitude samples.
    #[serde(rename = "AltitudeDelta_m")]
    pub altitude_delta_m: f64,
    #[serde(rename = "AltitudeDelta_formatted")]
    pub altitude_delta_formatted: String,
}

impl LapView {
    pub fn new(record: PersistedRecord<LapRecord>) -> Self {
        let lap = record.record;
        Self {
            total_time_formatted: format_seconds(lap.total_time_s),
            distance_formatted: format_distance(lap.distance_m),
            altitude_delta_m: 0.0,
            altitude_delta_formatted: format_altitude(0.0),
            source_file: record.source_file,
            lap,
        }
    }

    fn set_altitude_delta(&mut self, delta: f64) {
        self.altitude_delta_m = delta;
        self.altitude_delta_formatted = format_altitude(delta);
    }
}

/// Laps grouped by source file.
pub type GroupedLaps = BTreeMap<String, Vec<LapView>>;

/// Fastest/slowest lap and longest file by distance/time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Records {
    pub fastest: Option<LapView>,
    pub slowest: Option<LapView>,
    pub longest_distance: Option<FileSummary>,
    pub longest_time: Option<FileSummary>,
}

/// Read side used by the presentation layer.
pub struct Aggregator<'a> {
    store: &'a DocumentStore,
    sample_interval: usize,
    min_valid_lap_distance: f64,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            min_valid_lap_distance: MIN_VALID_LAP_DISTANCE,
        }
    }

    pub fn with_sample_interval(mut self, interval: usize) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_min_valid_lap_distance(mut self, meters: f64) -> Self {
        self.min_valid_lap_distance = meters;
        self
    }

    /// Summary laps grouped by source, plus the flat list in store order.
    pub fn load_summary(&self) -> AppResult<(GroupedLaps, Vec<LapView>)> {
        let records: Vec<PersistedRecord<LapRecord>> = self.load(RecordKind::Summary)?;

        let flat: Vec<LapView> = records.into_iter().map(LapView::new).collect();
        let mut grouped = GroupedLaps::new();
        for lap in &flat {
            grouped
                .entry(lap.source_file.clone())
                .or_default()
                .push(lap.clone());
        }
        Ok((grouped, flat))
    }

    /// Sampled, formatted, merge-annotated detail rows per source.
    pub fn load_detailed(&self) -> AppResult<BTreeMap<String, Vec<DisplayRow>>> {
        let mut by_source: BTreeMap<String, Vec<PersistedRecord<TrackpointRecord>>> =
            BTreeMap::new();
        for record in self.load::<TrackpointRecord>(RecordKind::Detail)? {
            by_source
                .entry(record.source_file.clone())
                .or_default()
                .push(record);
        }

        Ok(by_source
            .into_iter()
            .map(|(source, records)| (source, build_display_rows(records, self.sample_interval)))
            .collect())
    }

    /// Per-file totals plus all/valid laps per source, with altitude deltas
    /// taken from the stored detail records.
    pub fn calculate_file_summaries(
        &self,
        grouped: &GroupedLaps,
    ) -> AppResult<(Vec<FileSummary>, GroupedLaps, GroupedLaps)> {
        let detail: Vec<PersistedRecord<TrackpointRecord>> = self.load(RecordKind::Detail)?;
        Ok(summarize_files(
            grouped,
            &detail,
            self.min_valid_lap_distance,
        ))
    }

    pub fn find_records(&self, laps: &[LapView], summaries: &[FileSummary]) -> Records {
        find_records_with(laps, summaries, self.min_valid_lap_distance)
    }

    fn load<T: DeserializeOwned>(&self, kind: RecordKind) -> AppResult<Vec<PersistedRecord<T>>> {
        self.store
            .find_all(kind.collection())?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> AppResult<PersistedRecord<T>> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}

/// Pure part of [`Aggregator::calculate_file_summaries`].
///
/// Detail records are grouped per (source, lap) once; each lap's altitude
/// samples are time-ordered and reduced with [`altitude_delta`].
pub fn summarize_files(
    grouped: &GroupedLaps,
    detail: &[PersistedRecord<TrackpointRecord>],
    min_valid_lap_distance: f64,
) -> (Vec<FileSummary>, GroupedLaps, GroupedLaps) {
    let mut samples: BTreeMap<(&str, u32), Vec<(Option<&str>, f64)>> = BTreeMap::new();
    for r in detail {
        if let Some(alt) = r.record.altitude_m {
            samples
                .entry((r.source_file.as_str(), r.record.lap.lap_number))
                .or_default()
                .push((r.record.time.as_deref(), alt));
        }
    }

    let mut summaries = Vec::with_capacity(grouped.len());
    let mut all_laps = GroupedLaps::new();
    let mut valid_laps = GroupedLaps::new();

    for (source, laps) in grouped {
        let total_distance: f64 = laps
            .iter()
            .map(|l| l.lap.distance_m.as_number().unwrap_or(0.0))
            .sum();
        let total_time: f64 = laps
            .iter()
            .map(|l| l.lap.total_time_s.as_number().unwrap_or(0.0))
            .sum();

        summaries.push(FileSummary {
            source: source.clone(),
            date: extract_date_from_filename(source),
            total_distance_m: total_distance,
            total_distance_formatted: format_distance(total_distance),
            total_time_s: total_time,
            total_time_formatted: format_seconds(total_time),
        });

        let mut with_delta = Vec::with_capacity(laps.len());
        for lap in laps {
            let mut lap = lap.clone();
            let delta = match samples.get_mut(&(source.as_str(), lap.lap.lap_number)) {
                Some(points) => {
                    points.sort_by(|a, b| a.0.cmp(&b.0));
                    let alts: Vec<f64> = points.iter().map(|(_, a)| *a).collect();
                    altitude_delta(&alts)
                }
                None => 0.0,
            };
            lap.set_altitude_delta(delta);
            with_delta.push(lap);
        }

        let valid: Vec<LapView> = with_delta
            .iter()
            .filter(|l| is_valid_lap(l, min_valid_lap_distance))
            .cloned()
            .collect();

        all_laps.insert(source.clone(), with_delta);
        valid_laps.insert(source.clone(), valid);
    }

    (summaries, all_laps, valid_laps)
}

pub fn is_valid_lap(lap: &LapView, min_distance: f64) -> bool {
    lap.lap.distance_m.is_some_and(|d| d >= min_distance)
}

/// [`find_records_with`] using [`MIN_VALID_LAP_DISTANCE`].
pub fn find_records(laps: &[LapView], summaries: &[FileSummary]) -> Records {
    find_records_with(laps, summaries, MIN_VALID_LAP_DISTANCE)
}

/// Record holders. Lap records only consider valid laps with a time; file
/// records consider every file. Ties keep the first one encountered.
pub fn find_records_with(
    laps: &[LapView],
    summaries: &[FileSummary],
    min_valid_lap_distance: f64,
) -> Records {
    let timed = || {
        laps.iter()
            .filter(|l| is_valid_lap(l, min_valid_lap_distance))
            .filter_map(|l| l.lap.total_time_s.map(|t| (t, l)))
    };

    Records {
        fastest: first_best(timed(), |a, b| a < b).cloned(),
        slowest: first_best(timed(), |a, b| a > b).cloned(),
        longest_distance: first_best(
            summaries.iter().map(|s| (s.total_distance_m, s)),
            |a, b| a > b,
        )
        .cloned(),
        longest_time: first_best(summaries.iter().map(|s| (s.total_time_s, s)), |a, b| a > b)
            .cloned(),
    }
}

/// Stable selection: a later item replaces the current one only when
/// strictly better.
fn first_best<T>(items: impl Iterator<Item = (f64, T)>, better: impl Fn(f64, f64) -> bool) -> Option<T> {
    let mut best: Option<(f64, T)> = None;
    for (key, item) in items {
        match &best {
            Some((current, _)) if !better(key, *current) => {}
            _ => best = Some((key, item)),
        }
    }
    best.map(|(_, item)| item)
}
