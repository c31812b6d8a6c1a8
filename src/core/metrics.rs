//! Metric derivation shared by ingestion and aggregation.
//!
//! All conversions from "something that should be a number" go through
//! [`AsNumber`]: a value that is missing, not numeric, or not finite becomes
//! `None`. Nothing in here returns an error.

use serde_json::Value;

const SECONDS_PER_MINUTE: f64 = 60.0;
const METERS_PER_KM: f64 = 1000.0;

/// Parse-or-absent conversion to `f64`.
pub trait AsNumber {
    fn as_number(&self) -> Option<f64>;
}

/// Parse a textual number; surrounding whitespace is ignored.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl AsNumber for f64 {
    fn as_number(&self) -> Option<f64> {
        Some(*self).filter(|v| v.is_finite())
    }
}

impl AsNumber for i64 {
    fn as_number(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AsNumber for i32 {
    fn as_number(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl AsNumber for u32 {
    fn as_number(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl AsNumber for str {
    fn as_number(&self) -> Option<f64> {
        parse_number(self)
    }
}

impl AsNumber for String {
    fn as_number(&self) -> Option<f64> {
        parse_number(self)
    }
}

impl AsNumber for Value {
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }
}

impl<T: AsNumber> AsNumber for Option<T> {
    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(AsNumber::as_number)
    }
}

impl<T: AsNumber + ?Sized> AsNumber for &T {
    fn as_number(&self) -> Option<f64> {
        (**self).as_number()
    }
}

/// Pace in minutes per kilometre from seconds and metres.
///
/// Undefined (not zero) when either input is absent, non-numeric, zero or
/// negative.
pub fn pace(total_time_s: impl AsNumber, distance_m: impl AsNumber) -> Option<f64> {
    let t = total_time_s.as_number().filter(|t| *t > 0.0)?;
    let d = distance_m.as_number().filter(|d| *d > 0.0)?;
    Some((t / (d / METERS_PER_KM)) / SECONDS_PER_MINUTE)
}

/// Net elevation change: the sum of signed consecutive differences.
///
/// This is not total ascent. `[100, 120, 110, 130, 105]` gives `5.0`.
pub fn altitude_delta(samples: &[f64]) -> f64 {
    samples.windows(2).map(|w| w[1] - w[0]).sum()
}

/// Running [`altitude_delta`] for every prefix of `samples`.
pub fn accumulated_altitude_deltas(samples: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(samples.len());
    for (i, alt) in samples.iter().enumerate() {
        if i > 0 {
            acc += alt - samples[i - 1];
        }
        out.push(acc);
    }
    out
}
