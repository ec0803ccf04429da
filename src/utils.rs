use chrono::{DateTime, SecondsFormat, Utc};

/// Calendar date used as the draw/history key, `YYYY-MM-DD` in UTC.
pub fn format_draw_date(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

pub fn today() -> String {
    format_draw_date(Utc::now())
}

/// ISO 8601 timestamp with millisecond precision, e.g. `2024-03-01T09:30:00.000Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a positive count from a path or query parameter, falling back to
/// `default` for anything missing, malformed or zero.
pub fn parse_count(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(default)
}
