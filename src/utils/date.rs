use regex::Regex;
use std::sync::LazyLock;

static DATE_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static date pattern"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static date pattern"));

/// True for exactly `YYYY-MM-DD` (digits only, no range check).
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s)
}

/// First `YYYY-MM-DD` substring of a filename, or the filename itself.
///
/// `RunnerUp_2025-08-05-08-24-01_Running.tcx` → `2025-08-05`.
pub fn extract_date_from_filename(filename: &str) -> String {
    DATE_IN_NAME
        .find(filename)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| filename.to_string())
}

