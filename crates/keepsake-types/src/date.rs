use chrono::{Local, NaiveDate};

/// Normalize a feed date to a calendar date.
///
/// Feed entries carry either a bare `YYYY-MM-DD` or a full ISO-8601 timestamp
/// like `2025-09-03T10:30:00Z`. We take the first 10 characters and parse them
/// as a date. No timezone conversion: the author's calendar date wins.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// The device's current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
