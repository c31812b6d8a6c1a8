use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::aggregate::Aggregator;
use crate::core::sampler::{DisplayRow, MergeColumn};
use crate::db::DocumentStore;
use crate::errors::AppResult;
use crate::ui::messages::{info, warning};
use crate::utils::formatting::{bold, friendly_column_name};
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;
use std::collections::BTreeMap;

const COLUMNS: [&str; 10] = [
    "_source_file",
    "LapNumber",
    "LapStartTime",
    "LapTotalTime_s",
    "Pace_min_per_km",
    "Time",
    "Distance_m",
    "Altitude_m",
    "AltitudeDelta_m",
    "Position",
];

/// Handle the `detail` command: sampled trackpoints with merged lap cells.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Detail { source, json } = cmd else {
        return Ok(());
    };

    let store = DocumentStore::open(expand_tilde(&cfg.database), cfg.busy_timeout())?;
    let loaded = Aggregator::new(&store)
        .with_sample_interval(cfg.sample_interval)
        .load_detailed();
    store.close()?;

    let mut detailed = loaded?;
    if let Some(name) = source {
        detailed.retain(|k, _| k == name);
        if detailed.is_empty() {
            warning(format!("No detail records for '{name}'"));
            return Ok(());
        }
    }

    if *json {
        println!("{}", serde_json::to_string_pretty(&detailed)?);
        return Ok(());
    }

    if detailed.is_empty() {
        info("No detail records stored yet.");
        return Ok(());
    }

    render(&detailed);
    Ok(())
}

fn render(detailed: &BTreeMap<String, Vec<DisplayRow>>) {
    let headers: Vec<&str> = COLUMNS.iter().map(|c| friendly_column_name(*c)).collect();

    for (source, rows) in detailed {
        println!("{} ({} rows)", bold(source), rows.len());

        let mut table = Table::with_headers(&headers);
        for row in rows {
            let lap = &row.point.lap;
            let merged = |column: MergeColumn, value: String| {
                if row.shows(column) { value } else { String::new() }
            };
            let position = row
                .point
                .position()
                .map(|(lat, lon)| format!("{lat:.5}, {lon:.5}"))
                .unwrap_or_default();

            table.add_row(vec![
                merged(MergeColumn::SourceFile, row.source_file.clone()),
                merged(MergeColumn::LapNumber, lap.lap_number.to_string()),
                merged(
                    MergeColumn::LapStartTime,
                    lap.start_time.clone().unwrap_or_default(),
                ),
                merged(MergeColumn::LapTotalTime, row.lap_total_time_formatted.clone()),
                merged(MergeColumn::Pace, row.pace_formatted.clone()),
                row.point.time.clone().unwrap_or_default(),
                row.distance_formatted.clone(),
                row.altitude_formatted.clone(),
                row.altitude_delta_formatted.clone(),
                position,
            ]);
        }
        print!("{}", table.render());
        println!();
    }
}
