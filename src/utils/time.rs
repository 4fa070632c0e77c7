use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

/// Naive timestamp layouts accepted from feeds that drop the offset. Read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a market start time.
///
/// RFC 3339 is tried first; a timestamp without an offset is interpreted as UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Closed UTC interval covering the whole of `date`.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::nanoseconds(1);
    (start, end)
}

/// Returns true if `ts` falls on `date` (UTC).
pub fn within_day(ts: DateTime<Utc>, date: NaiveDate) -> bool {
    let (start, end) = day_window(date);
    ts >= start && ts <= end
}

/// Builds a fixed offset from minutes east of UTC, falling back to UTC when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Formats a race label as `HH:MM - Course - Name` in the given offset.
pub fn race_label(start: DateTime<Utc>, course: &str, name: &str, offset: FixedOffset) -> String {
    let local = start.with_timezone(&offset);
    format!("{}  -  {}  -  {}", local.format("%H:%M"), course, name)
}
