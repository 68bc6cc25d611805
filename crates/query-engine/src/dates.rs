use chrono::{DateTime, NaiveDate, Utc};
use core_types::Value;

/// Reads `YYYY-MM-DD` or an RFC 3339 timestamp as a point in time.
///
/// A bare date stands for midnight UTC of that day.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// The calendar day a date field names, in the field's own offset.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let Value::Text(text) = value else {
        return None;
    };
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}
