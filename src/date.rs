// ISO-8601 instants in the `2026-10-17T09:30:00.123Z` shape used on the wire

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current wall-clock time as an ISO-8601 UTC string
pub fn now_instant() -> String {
    format_instant(Utc::now())
}

/// Format an epoch-millisecond value, `None` when it falls outside the calendar chrono supports
pub fn instant_from_millis(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis).single().map(format_instant)
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
