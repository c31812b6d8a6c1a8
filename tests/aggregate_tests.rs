use serde_json::{Value, json};
use tcxlog::core::aggregate::{
    Aggregator, GroupedLaps, LapView, find_records, find_records_with, summarize_files,
};
use tcxlog::core::sampler::{MergeCell, MergeColumn, build_display_rows, merge_spans, sample_indices};
use tcxlog::db::{Document, DocumentStore, UniqueKeys};
use tcxlog::models::{LapRecord, PersistedRecord, TrackpointRecord};

fn lap(source: &str, number: u32, distance: Option<f64>, time: Option<f64>) -> LapView {
    LapView::new(PersistedRecord::new(
        LapRecord {
            lap_number: number,
            start_time: Some(format!("2025-08-05T08:{:02}:00Z", number)),
            total_time_s: time,
            distance_m: distance,
            pace_min_per_km: None,
        },
        source,
    ))
}

fn point(source: &str, lap_number: u32, time: &str, altitude: Option<f64>) -> PersistedRecord<TrackpointRecord> {
    PersistedRecord::new(
        TrackpointRecord {
            lap: LapRecord {
                lap_number,
                ..LapRecord::default()
            },
            time: Some(time.to_string()),
            altitude_m: altitude,
            ..TrackpointRecord::default()
        },
        source,
    )
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// ---------------------------
// Record holders
// ---------------------------

#[test]
fn fastest_and_slowest_ignore_short_laps() {
    let laps = vec![
        lap("a.tcx", 1, Some(1000.0), Some(300.0)),
        lap("a.tcx", 2, Some(1000.0), Some(250.0)),
        lap("a.tcx", 3, Some(1000.0), Some(400.0)),
        lap("a.tcx", 4, Some(500.0), Some(200.0)),
    ];

    let records = find_records(&laps, &[]);

    assert_eq!(records.fastest.expect("fastest").lap.total_time_s, Some(250.0));
    assert_eq!(records.slowest.expect("slowest").lap.total_time_s, Some(400.0));
    assert!(records.longest_distance.is_none());
    assert!(records.longest_time.is_none());
}

#[test]
fn ties_keep_the_first_lap() {
    let laps = vec![
        lap("a.tcx", 1, Some(1000.0), Some(300.0)),
        lap("b.tcx", 1, Some(1000.0), Some(300.0)),
    ];

    let records = find_records(&laps, &[]);

    assert_eq!(records.fastest.expect("fastest").source_file, "a.tcx");
    assert_eq!(records.slowest.expect("slowest").source_file, "a.tcx");
}

#[test]
fn laps_without_time_are_not_candidates() {
    let laps = vec![
        lap("a.tcx", 1, Some(1000.0), None),
        lap("a.tcx", 2, None, Some(100.0)),
    ];

    let records = find_records(&laps, &[]);
    assert!(records.fastest.is_none());
    assert!(records.slowest.is_none());
}

#[test]
fn threshold_is_configurable() {
    let laps = vec![
        lap("a.tcx", 1, Some(1000.0), Some(300.0)),
        lap("a.tcx", 2, Some(500.0), Some(120.0)),
    ];

    let records = find_records_with(&laps, &[], 400.0);
    assert_eq!(records.fastest.expect("fastest").lap.lap_number, 2);
}

#[test]
fn empty_input_gives_no_records() {
    let records = find_records(&[], &[]);
    assert_eq!(records, Default::default());
}

// ---------------------------
// File summaries
// ---------------------------

#[test]
fn file_totals_sum_laps_and_coerce_missing_values_to_zero() {
    let mut grouped = GroupedLaps::new();
    grouped.insert(
        "RunnerUp_2025-08-05-08-24-01_Running.tcx".to_string(),
        vec![
            lap("RunnerUp_2025-08-05-08-24-01_Running.tcx", 1, Some(1000.0), Some(300.0)),
            lap("RunnerUp_2025-08-05-08-24-01_Running.tcx", 2, Some(800.0), None),
        ],
    );
    grouped.insert(
        "test1.tcx".to_string(),
        vec![lap("test1.tcx", 1, None, None)],
    );

    let (summaries, all_laps, valid_laps) = summarize_files(&grouped, &[], 990.0);

    assert_eq!(summaries.len(), 2);
    let run = &summaries[0];
    assert_eq!(run.date, "2025-08-05");
    assert_eq!(run.total_distance_m, 1800.0);
    assert_eq!(run.total_time_s, 300.0);
    assert_eq!(run.total_distance_formatted, "1.80 km");
    assert_eq!(run.total_time_formatted, "0:05:00");

    let invalid = &summaries[1];
    assert_eq!(invalid.source, "test1.tcx");
    assert_eq!(invalid.date, "test1.tcx");
    assert_eq!(invalid.total_distance_m, 0.0);
    assert_eq!(invalid.total_time_s, 0.0);

    assert_eq!(all_laps["test1.tcx"].len(), 1);
    assert!(valid_laps.contains_key("test1.tcx"));
    assert!(valid_laps["test1.tcx"].is_empty());
    assert_eq!(valid_laps["RunnerUp_2025-08-05-08-24-01_Running.tcx"].len(), 1);
}

#[test]
fn lap_altitude_delta_uses_time_ordered_detail_samples() {
    let mut grouped = GroupedLaps::new();
    grouped.insert(
        "a.tcx".to_string(),
        vec![
            lap("a.tcx", 1, Some(1000.0), Some(300.0)),
            lap("a.tcx", 2, Some(1000.0), Some(300.0)),
        ],
    );

    // stored out of order; lap 2 has no altitude at all
    let detail = vec![
        point("a.tcx", 1, "2025-08-05T08:00:03Z", Some(110.0)),
        point("a.tcx", 1, "2025-08-05T08:00:01Z", Some(100.0)),
        point("a.tcx", 1, "2025-08-05T08:00:02Z", Some(120.0)),
        point("a.tcx", 1, "2025-08-05T08:00:04Z", None),
        point("a.tcx", 2, "2025-08-05T08:05:00Z", None),
        point("b.tcx", 1, "2025-08-05T08:00:05Z", Some(999.0)),
    ];

    let (_, all_laps, _) = summarize_files(&grouped, &detail, 990.0);
    let laps = &all_laps["a.tcx"];

    assert_eq!(laps[0].altitude_delta_m, 10.0);
    assert_eq!(laps[0].altitude_delta_formatted, "10.00 m");
    assert_eq!(laps[1].altitude_delta_m, 0.0);
}

#[test]
fn aggregator_reads_back_stored_records() {
    let mut store = DocumentStore::open_in_memory().expect("open");
    let keys = UniqueKeys::new(["LapNumber", "_source_file"]).expect("keys");
    store
        .upsert(
            "summary",
            &[
                doc(json!({"LapNumber": 1, "LapDistance_m": 1000.0, "LapTotalTime_s": 300.0, "_source_file": "a.tcx"})),
                doc(json!({"LapNumber": 2, "LapDistance_m": "invalid", "LapTotalTime_s": "300", "_source_file": "a.tcx"})),
                doc(json!({"LapNumber": 1, "LapDistance_m": 2000.0, "LapTotalTime_s": 700.0, "_source_file": "b.tcx"})),
            ],
            &keys,
        )
        .expect("upsert");

    let aggregator = Aggregator::new(&store);
    let (grouped, flat) = aggregator.load_summary().expect("load");
    assert_eq!(flat.len(), 3);
    assert_eq!(grouped["a.tcx"].len(), 2);
    assert_eq!(grouped["a.tcx"][1].lap.distance_m, None);
    assert_eq!(grouped["a.tcx"][1].lap.total_time_s, Some(300.0));

    let (summaries, _, _) = aggregator.calculate_file_summaries(&grouped).expect("summaries");
    assert_eq!(summaries[0].total_distance_m, 1000.0);
    assert_eq!(summaries[0].total_time_s, 600.0);

    let records = aggregator.find_records(&flat, &summaries);
    assert_eq!(records.longest_distance.expect("longest").source, "b.tcx");
    assert_eq!(records.longest_time.expect("longest").source, "b.tcx");
    assert_eq!(records.fastest.expect("fastest").source_file, "a.tcx");
}

#[test]
fn empty_store_gives_empty_views() {
    let store = DocumentStore::open_in_memory().expect("open");
    let aggregator = Aggregator::new(&store);

    let (grouped, flat) = aggregator.load_summary().expect("load");
    assert!(grouped.is_empty());
    assert!(flat.is_empty());
    assert!(aggregator.load_detailed().expect("detail").is_empty());
}

// ---------------------------
// Display sampler
// ---------------------------

#[test]
fn sampling_keeps_every_stride_th_row_without_forcing_the_last() {
    assert_eq!(sample_indices(120, 60), vec![0, 60]);
    assert_eq!(sample_indices(121, 60), vec![0, 60, 120]);
    assert_eq!(sample_indices(1, 60), vec![0]);
    assert!(sample_indices(0, 60).is_empty());
    assert_eq!(sample_indices(3, 1), vec![0, 1, 2]);
}

#[test]
fn merge_spans_are_run_lengths() {
    let cells = merge_spans(&[1, 1, 2]);
    assert_eq!(
        cells,
        vec![
            MergeCell { show: true, rowspan: 2 },
            MergeCell { show: false, rowspan: 0 },
            MergeCell { show: true, rowspan: 1 },
        ]
    );
    assert!(merge_spans::<i32>(&[]).is_empty());
}

#[test]
fn display_rows_are_sampled_then_merged() {
    let mut records = Vec::new();
    for i in 0..120u32 {
        let lap_number = if i < 90 { 1 } else { 2 };
        records.push(point(
            "a.tcx",
            lap_number,
            &format!("2025-08-05T08:{:02}:{:02}Z", i / 60, i % 60),
            Some(100.0 + f64::from(i)),
        ));
    }
    records.reverse();

    let rows = build_display_rows(records, 30);

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].point.time.as_deref(), Some("2025-08-05T08:00:00Z"));
    assert_eq!(rows[3].point.time.as_deref(), Some("2025-08-05T08:01:30Z"));

    let laps: Vec<u32> = rows.iter().map(|r| r.point.lap.lap_number).collect();
    assert_eq!(laps, vec![1, 1, 1, 2]);
    assert_eq!(
        rows[0].merge_info[&MergeColumn::LapNumber],
        MergeCell { show: true, rowspan: 3 }
    );
    assert!(!rows[1].shows(MergeColumn::LapNumber));
    assert!(rows[3].shows(MergeColumn::LapNumber));
    assert_eq!(
        rows[0].merge_info[&MergeColumn::SourceFile],
        MergeCell { show: true, rowspan: 4 }
    );

    // accumulated over every row of the lap, not just the sampled ones
    assert_eq!(rows[0].altitude_delta_m, Some(0.0));
    assert_eq!(rows[2].altitude_delta_m, Some(60.0));
    assert_eq!(rows[3].altitude_delta_m, Some(0.0));
    assert_eq!(rows[2].altitude_delta_formatted, "60.00 m");
}
