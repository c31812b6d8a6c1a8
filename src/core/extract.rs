//! TCX (Garmin Training Center XML) record extractor.
//!
//! Walks the document once with `quick-xml` and produces one [`LapRecord`]
//! per `<Lap>` plus the trackpoints nested anywhere below it. Elements are
//! matched by local name so prefixed and default-namespace documents read
//! the same way.

use crate::core::metrics::{pace, parse_number};
use crate::errors::{AppError, AppResult};
use crate::models::{LapRecord, TrackpointRecord};
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sheet-name date used when the first lap carries no usable start time.
pub const UNKNOWN_DATE: &str = "UnknownDate";

/// A lap together with its trackpoints in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LapWithPoints {
    pub lap: LapRecord,
    pub trackpoints: Vec<TrackpointRecord>,
}

/// Raw text collected for a lap before the totals are known.
#[derive(Default)]
struct LapDraft {
    start_time: Option<String>,
    total_time: Option<String>,
    distance: Option<String>,
    points: Vec<PointDraft>,
}

#[derive(Default)]
struct PointDraft {
    time: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    altitude: Option<String>,
    distance: Option<String>,
}

/// Parse a TCX document into laps with their trackpoints.
pub fn parse_detailed<R: BufRead>(source: R) -> AppResult<Vec<LapWithPoints>> {
    let mut reader = XmlReader::from_reader(source);
    reader.trim_text(true);
    reader.check_end_names(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();
    let mut seen_root = false;

    let mut laps: Vec<LapWithPoints> = Vec::new();
    let mut lap: Option<LapDraft> = None;
    let mut point: Option<PointDraft> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            AppError::MalformedInput(format!(
                "XML error at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                if stack.is_empty() {
                    if seen_root {
                        return Err(malformed("content after the root element"));
                    }
                    seen_root = true;
                }
                let name = e.local_name().as_ref().to_vec();
                open_element(&name, e, &mut lap, &mut point)?;
                stack.push(name);
                text.clear();
            }
            Event::Empty(ref e) => {
                if stack.is_empty() {
                    if seen_root {
                        return Err(malformed("content after the root element"));
                    }
                    seen_root = true;
                }
                let name = e.local_name().as_ref().to_vec();
                open_element(&name, e, &mut lap, &mut point)?;
                stack.push(name);
                text.clear();
                close_element(&stack, None, &mut lap, &mut point, &mut laps);
                stack.pop();
            }
            Event::Text(ref e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| AppError::MalformedInput(format!("bad text content: {err}")))?;
                if stack.is_empty() {
                    if !unescaped.trim().is_empty() {
                        return Err(malformed("text outside the root element"));
                    }
                } else {
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref e) => {
                if stack.is_empty() {
                    return Err(malformed("CDATA outside the root element"));
                }
                text.push_str(&String::from_utf8_lossy(e));
            }
            Event::End(_) => {
                if stack.is_empty() {
                    return Err(malformed("closing tag without a matching opening tag"));
                }
                let leaf = if text.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut text))
                };
                close_element(&stack, leaf, &mut lap, &mut point, &mut laps);
                stack.pop();
                text.clear();
            }
            Event::Eof => break,
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed("no root element found"));
    }
    if !stack.is_empty() {
        return Err(malformed("unexpected end of document (unclosed elements)"));
    }

    Ok(laps)
}

/// Parse a TCX document into lap summaries only.
pub fn parse_summary<R: BufRead>(source: R) -> AppResult<Vec<LapRecord>> {
    Ok(parse_detailed(source)?
        .into_iter()
        .map(|l| l.lap)
        .collect())
}

/// Open and parse a TCX file.
pub fn parse_file(path: &Path) -> AppResult<Vec<LapWithPoints>> {
    let file = File::open(path)?;
    parse_detailed(BufReader::new(file))
}

/// Date of the first lap (`YYYY-MM-DD`), or [`UNKNOWN_DATE`].
///
/// Best-effort: unreadable or malformed files also yield the sentinel.
pub fn first_lap_date(path: &Path) -> String {
    match parse_file(path) {
        Ok(laps) => laps_date(&laps),
        Err(_) => UNKNOWN_DATE.to_string(),
    }
}

/// Same as [`first_lap_date`] for already extracted laps.
pub fn laps_date(laps: &[LapWithPoints]) -> String {
    laps.first()
        .and_then(|l| l.lap.start_date())
        .unwrap_or(UNKNOWN_DATE)
        .to_string()
}

fn malformed(reason: &str) -> AppError {
    AppError::MalformedInput(reason.to_string())
}

fn open_element(
    name: &[u8],
    e: &BytesStart<'_>,
    lap: &mut Option<LapDraft>,
    point: &mut Option<PointDraft>,
) -> AppResult<()> {
    match name {
        b"Lap" if lap.is_none() => {
            let mut draft = LapDraft::default();
            for attr in e.attributes() {
                let attr = attr
                    .map_err(|err| AppError::MalformedInput(format!("bad attribute: {err}")))?;
                if attr.key.local_name().as_ref() == b"StartTime" {
                    let value = attr.unescape_value().map_err(|err| {
                        AppError::MalformedInput(format!("bad attribute value: {err}"))
                    })?;
                    draft.start_time = Some(value.into_owned());
                }
            }
            *lap = Some(draft);
        }
        b"Trackpoint" if lap.is_some() && point.is_none() => {
            *point = Some(PointDraft::default());
        }
        _ => {}
    }
    Ok(())
}

/// Handle the end of the element on top of `stack`.
///
/// `leaf` is the text content collected since the element opened.
fn close_element(
    stack: &[Vec<u8>],
    leaf: Option<String>,
    lap: &mut Option<LapDraft>,
    point: &mut Option<PointDraft>,
    laps: &mut Vec<LapWithPoints>,
) {
    let n = stack.len();
    let name = stack[n - 1].as_slice();
    let parent = n.checked_sub(2).map(|i| stack[i].as_slice());
    let grandparent = n.checked_sub(3).map(|i| stack[i].as_slice());
    let nested_in = |tag: &[u8]| stack[..n - 1].iter().any(|s| s.as_slice() == tag);

    match (grandparent, parent, name) {
        (_, _, b"Lap") if !nested_in(b"Lap") => {
            if point.is_none()
                && let Some(draft) = lap.take()
            {
                let number = laps.len() as u32 + 1;
                laps.push(finish_lap(draft, number));
            }
        }
        (_, _, b"Trackpoint") if !nested_in(b"Trackpoint") => {
            if let (Some(p), Some(l)) = (point.take(), lap.as_mut()) {
                l.points.push(p);
            }
        }
        (_, Some(b"Lap"), b"TotalTimeSeconds") => {
            if let Some(l) = lap.as_mut() {
                l.total_time.get_or_insert(leaf.unwrap_or_default());
            }
        }
        (_, Some(b"Lap"), b"DistanceMeters") => {
            if let Some(l) = lap.as_mut() {
                l.distance.get_or_insert(leaf.unwrap_or_default());
            }
        }
        (_, Some(b"Trackpoint"), field) => {
            if let Some(p) = point.as_mut() {
                let slot = match field {
                    b"Time" => &mut p.time,
                    b"AltitudeMeters" => &mut p.altitude,
                    b"DistanceMeters" => &mut p.distance,
                    _ => return,
                };
                slot.get_or_insert(leaf.unwrap_or_default());
            }
        }
        (Some(b"Trackpoint"), Some(b"Position"), field) => {
            if let Some(p) = point.as_mut() {
                let slot = match field {
                    b"LatitudeDegrees" => &mut p.latitude,
                    b"LongitudeDegrees" => &mut p.longitude,
                    _ => return,
                };
                slot.get_or_insert(leaf.unwrap_or_default());
            }
        }
        _ => {}
    }
}

fn finish_lap(draft: LapDraft, lap_number: u32) -> LapWithPoints {
    let total_time_s = draft.total_time.as_deref().and_then(parse_number);
    let distance_m = draft.distance.as_deref().and_then(parse_number);

    let lap = LapRecord {
        lap_number,
        start_time: draft.start_time,
        total_time_s,
        distance_m,
        pace_min_per_km: pace(total_time_s, distance_m),
    };

    let trackpoints = draft
        .points
        .into_iter()
        .map(|p| {
            let latitude = p.latitude.as_deref().and_then(parse_number);
            let longitude = p.longitude.as_deref().and_then(parse_number);
            // coordinates are kept only as a pair
            let (latitude, longitude) = match (latitude, longitude) {
                (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
                _ => (None, None),
            };

            TrackpointRecord {
                lap: lap.clone(),
                time: p.time.filter(|t| !t.is_empty()),
                latitude,
                longitude,
                altitude_m: p.altitude.as_deref().and_then(parse_number),
                distance_m: p.distance.as_deref().and_then(parse_number),
            }
        })
        .collect();

    LapWithPoints { lap, trackpoints }
}
