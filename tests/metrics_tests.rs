use serde_json::json;
use tcxlog::core::metrics::{AsNumber, accumulated_altitude_deltas, altitude_delta, pace};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn pace_is_minutes_per_km() {
    assert!(approx(pace(300.0, 1000.0).unwrap(), 5.0));
    assert!(approx(pace(330.0, 1000.0).unwrap(), 5.5));
    assert!(approx(pace(1800.0, 5000.0).unwrap(), 6.0));
}

#[test]
fn pace_accepts_numeric_text() {
    assert!(approx(pace("300", " 1000.0 ").unwrap(), 5.0));
}

#[test]
fn pace_is_undefined_for_missing_or_non_positive_inputs() {
    assert_eq!(pace(0.0, 1000.0), None);
    assert_eq!(pace(300.0, 0.0), None);
    assert_eq!(pace(-10.0, 1000.0), None);
    assert_eq!(pace(300.0, -1.0), None);
    assert_eq!(pace(None::<f64>, 1000.0), None);
    assert_eq!(pace("abc", 1000.0), None);
    assert_eq!(pace(f64::NAN, 1000.0), None);
}

#[test]
fn altitude_delta_is_net_change() {
    assert!(approx(altitude_delta(&[100.0, 120.0, 110.0, 130.0, 105.0]), 5.0));
    assert!(approx(altitude_delta(&[130.0, 120.0, 125.0, 110.0, 100.0]), -30.0));
    assert!(approx(altitude_delta(&[100.0, 110.0, 100.0]), 0.0));
}

#[test]
fn altitude_delta_of_short_sequences_is_zero() {
    assert_eq!(altitude_delta(&[]), 0.0);
    assert_eq!(altitude_delta(&[42.0]), 0.0);
}

#[test]
fn altitude_delta_reversed_is_negated() {
    let samples = [12.5, 40.0, 33.0, 7.25, 19.0];
    let mut reversed = samples;
    reversed.reverse();
    assert!(approx(altitude_delta(&reversed), -altitude_delta(&samples)));
    assert!(approx(altitude_delta(&samples), 19.0 - 12.5));
}

#[test]
fn accumulated_deltas_follow_each_prefix() {
    let acc = accumulated_altitude_deltas(&[100.0, 120.0, 110.0]);
    assert_eq!(acc, vec![0.0, 20.0, 10.0]);
    assert!(accumulated_altitude_deltas(&[]).is_empty());
}

#[test]
fn as_number_parses_or_gives_none() {
    assert_eq!(AsNumber::as_number(&json!(3.5)), Some(3.5));
    assert_eq!(AsNumber::as_number(&json!("7")), Some(7.0));
    assert_eq!(AsNumber::as_number(&json!("invalid")), None);
    assert_eq!(AsNumber::as_number(&json!(null)), None);
    assert_eq!(AsNumber::as_number(&json!([1, 2])), None);
    assert_eq!("  12.5 ".as_number(), Some(12.5));
    assert_eq!(f64::INFINITY.as_number(), None);
}
