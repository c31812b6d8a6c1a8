use super::lenient;
use crate::utils::date::is_iso_date;
use serde::{Deserialize, Serialize};

/// One completed lap, as extracted from a TCX `<Lap>` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LapRecord {
    /// 1-based position of the lap inside its file (assigned by the extractor).
    #[serde(rename = "LapNumber", default, deserialize_with = "lenient::lap_number")]
    pub lap_number: u32,

    /// `StartTime` attribute, kept verbatim (ISO-8601).
    #[serde(rename = "LapStartTime", default, deserialize_with = "lenient::text")]
    pub start_time: Option<String>,

    #[serde(rename = "LapTotalTime_s", default, deserialize_with = "lenient::number")]
    pub total_time_s: Option<f64>,

    #[serde(rename = "LapDistance_m", default, deserialize_with = "lenient::number")]
    pub distance_m: Option<f64>,

    /// Derived: minutes per km, present only when time and distance are both > 0.
    #[serde(rename = "Pace_min_per_km", default, deserialize_with = "lenient::number")]
    pub pace_min_per_km: Option<f64>,
}

impl LapRecord {
    /// Date portion of the start time. `None` unless the text before the
    /// `T` separator is a `YYYY-MM-DD` date, so it is always sheet-name safe.
    pub fn start_date(&self) -> Option<&str> {
        self.start_time
            .as_deref()
            .and_then(|s| s.split_once('T'))
            .map(|(date, _)| date)
            .filter(|date| is_iso_date(date))
    }
}
