use crate::config::Config;
use crate::core::aggregate::{Aggregator, LapView};
use crate::db::DocumentStore;
use crate::errors::AppResult;
use crate::models::FileSummary;
use crate::ui::messages::{header, info};
use crate::utils::formatting::{bold, format_pace};
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

/// Handle the `summary` command: per-file totals and record holders.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = DocumentStore::open(expand_tilde(&cfg.database), cfg.busy_timeout())?;
    let result = render(&store, cfg);
    store.close()?;
    result
}

fn render(store: &DocumentStore, cfg: &Config) -> AppResult<()> {
    let aggregator =
        Aggregator::new(store).with_min_valid_lap_distance(cfg.min_valid_lap_distance);

    let (grouped, flat) = aggregator.load_summary()?;
    if flat.is_empty() {
        info("No summary records stored yet.");
        return Ok(());
    }

    let (summaries, all_laps, _valid) = aggregator.calculate_file_summaries(&grouped)?;
    let records = aggregator.find_records(&flat, &summaries);

    header("Files");
    let mut files = Table::with_headers(&["Source", "Date", "Distance", "Time"]);
    for s in &summaries {
        files.add_row(vec![
            s.source.clone(),
            s.date.clone(),
            s.total_distance_formatted.clone(),
            s.total_time_formatted.clone(),
        ]);
    }
    print!("{}", files.render());

    for (source, laps) in &all_laps {
        println!();
        println!("{}", bold(source));
        let mut table = Table::with_headers(&["Lap", "Start", "Time", "Distance", "Pace", "Altitude Δ"]);
        for lap in laps {
            table.add_row(vec![
                lap.lap.lap_number.to_string(),
                lap.lap.start_time.clone().unwrap_or_default(),
                lap.total_time_formatted.clone(),
                lap.distance_formatted.clone(),
                format_pace(lap.lap.pace_min_per_km),
                lap.altitude_delta_formatted.clone(),
            ]);
        }
        print!("{}", table.render());
    }

    println!();
    header("Records");
    println!("{:<18}{}", "Fastest lap", describe_lap(records.fastest.as_ref()));
    println!("{:<18}{}", "Slowest lap", describe_lap(records.slowest.as_ref()));
    println!(
        "{:<18}{}",
        "Longest distance",
        describe_file(records.longest_distance.as_ref(), |s| &s.total_distance_formatted)
    );
    println!(
        "{:<18}{}",
        "Longest time",
        describe_file(records.longest_time.as_ref(), |s| &s.total_time_formatted)
    );

    Ok(())
}

fn describe_lap(lap: Option<&LapView>) -> String {
    match lap {
        Some(l) => format!(
            "{} ({}, lap {}, {})",
            l.total_time_formatted,
            l.source_file,
            l.lap.lap_number,
            format_pace(l.lap.pace_min_per_km)
        ),
        None => "-".to_string(),
    }
}

fn describe_file(file: Option<&FileSummary>, value: impl Fn(&FileSummary) -> &String) -> String {
    match file {
        Some(s) => format!("{} ({})", value(s), s.source),
        None => "-".to_string(),
    }
}
