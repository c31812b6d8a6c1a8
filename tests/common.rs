#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn tcx() -> Command {
    cargo_bin_cmd!("tcxlog")
}

/// Two laps of two trackpoints each; lap 1 is 1000 m in 300 s, lap 2 is
/// 1000 m in 330 s.
pub const TWO_LAPS_TCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="Running">
      <Id>2025-08-05T08:24:01Z</Id>
      <Lap StartTime="2025-08-05T08:24:01Z">
        <TotalTimeSeconds>300.0</TotalTimeSeconds>
        <DistanceMeters>1000.0</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2025-08-05T08:24:01Z</Time>
            <Position>
              <LatitudeDegrees>45.4642</LatitudeDegrees>
              <LongitudeDegrees>9.19</LongitudeDegrees>
            </Position>
            <AltitudeMeters>100.0</AltitudeMeters>
            <DistanceMeters>0.0</DistanceMeters>
            <HeartRateBpm><Value>140</Value></HeartRateBpm>
          </Trackpoint>
          <Trackpoint>
            <Time>2025-08-05T08:29:01Z</Time>
            <Position>
              <LatitudeDegrees>45.4700</LatitudeDegrees>
              <LongitudeDegrees>9.20</LongitudeDegrees>
            </Position>
            <AltitudeMeters>120.0</AltitudeMeters>
            <DistanceMeters>1000.0</DistanceMeters>
          </Trackpoint>
        </Track>
      </Lap>
      <Lap StartTime="2025-08-05T08:29:01Z">
        <TotalTimeSeconds>330.0</TotalTimeSeconds>
        <DistanceMeters>1000.0</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2025-08-05T08:29:02Z</Time>
            <AltitudeMeters>110.0</AltitudeMeters>
            <DistanceMeters>1001.0</DistanceMeters>
          </Trackpoint>
          <Trackpoint>
            <Time>2025-08-05T08:34:31Z</Time>
            <AltitudeMeters>105.0</AltitudeMeters>
            <DistanceMeters>2000.0</DistanceMeters>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>
"#;

/// One lap with no totals and no `StartTime`.
pub const BARE_LAP_TCX: &str = r#"<?xml version="1.0"?>
<TrainingCenterDatabase>
  <Activities>
    <Activity>
      <Lap>
        <Track>
          <Trackpoint>
            <Time>2025-01-01T10:00:00Z</Time>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>
"#;

pub const MALFORMED_TCX: &str = r#"<?xml version="1.0"?>
<TrainingCenterDatabase>
  <Activities>
    <Activity>
      <Lap StartTime="2025-08-05T08:24:01Z">
        <TotalTimeSeconds>300</TotalTimeSeconds>
    </Activity>
"#;

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_tcxlog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    fs::remove_file(&path).ok();
    path
}

/// Fresh, empty directory inside tempdir
pub fn temp_dir(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_tcxlog_dir", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// Write `content` as `dir/file_name` and return the full path
pub fn write_file(dir: &std::path::Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, content).expect("write fixture");
    path
}
