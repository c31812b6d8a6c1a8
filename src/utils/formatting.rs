//! Formatting utilities used for CLI and aggregation outputs.
//!
//! Every formatter accepts anything [`AsNumber`] understands and falls back
//! to a zero rendering for values that are not numbers.

use crate::core::metrics::AsNumber;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// `H:MM:SS` (days prefixed as `N day(s), `); invalid input → `00:00:00`.
pub fn format_seconds(value: impl AsNumber) -> String {
    let Some(secs) = value.as_number() else {
        return "00:00:00".to_string();
    };
    if secs < 0.0 {
        return "00:00:00".to_string();
    }

    let total = secs.trunc() as i64;
    let days = total / 86_400;
    let rem = total % 86_400;
    let hms = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);

    match days {
        0 => hms,
        1 => format!("1 day, {hms}"),
        d => format!("{d} days, {hms}"),
    }
}

/// Metres below 1 km, kilometres from 1000 m up.
pub fn format_distance(value: impl AsNumber) -> String {
    let meters = value.as_number().unwrap_or(0.0);
    if meters < 1000.0 {
        format!("{:.2} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

pub fn format_altitude(value: impl AsNumber) -> String {
    format!("{:.2} m", value.as_number().unwrap_or(0.0))
}

/// Minutes per km as `M:SS /km`; absent pace → `-`.
pub fn format_pace(value: impl AsNumber) -> String {
    let Some(pace) = value.as_number().filter(|p| *p > 0.0) else {
        return "-".to_string();
    };

    let mut minutes = pace.trunc() as i64;
    let mut seconds = ((pace - pace.trunc()) * 60.0).round() as i64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{minutes}:{seconds:02} /km")
}

/// Human-friendly label for a stored column name; unknown names pass through.
pub fn friendly_column_name(column: &str) -> &str {
    match column {
        "LapNumber" => "Lap",
        "Time" => "Time",
        "LapStartTime" => "Lap Start",
        "LapDistance_m" => "Lap Distance",
        "Distance_m" => "Distance",
        "Altitude_m" => "Altitude",
        "AltitudeDelta_m" => "Altitude Δ",
        "LapTotalTime_s" => "Lap Time",
        "Pace_min_per_km" => "Pace",
        "Latitude" | "Latitude_deg" => "Latitude",
        "Longitude" | "Longitude_deg" => "Longitude",
        "HeartRate_bpm" => "Heart Rate",
        "Speed_ms" => "Speed",
        "Cadence_rpm" => "Cadence",
        "_source_file" => "Source",
        other => other,
    }
}
