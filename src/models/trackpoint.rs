use super::lap::LapRecord;
use super::lenient;
use serde::{Deserialize, Serialize};

/// One timestamped sample inside a lap.
///
/// The parent lap is denormalized into every point so the record can be
/// stored as a single flat row/document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackpointRecord {
    #[serde(flatten)]
    pub lap: LapRecord,

    #[serde(rename = "Time", default, deserialize_with = "lenient::text")]
    pub time: Option<String>,

    #[serde(rename = "Latitude", default, deserialize_with = "lenient::number")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default, deserialize_with = "lenient::number")]
    pub longitude: Option<f64>,

    #[serde(rename = "Altitude_m", default, deserialize_with = "lenient::number")]
    pub altitude_m: Option<f64>,

    /// Cumulative distance at this sample.
    #[serde(rename = "Distance_m", default, deserialize_with = "lenient::number")]
    pub distance_m: Option<f64>,
}

impl TrackpointRecord {
    /// Latitude/longitude pair; both or neither.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
