//! Timestamp helpers shared by quotes and history points.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serializer;

/// Converts provider epoch seconds into an absolute UTC timestamp.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Formats as ISO-8601 UTC with millisecond precision, e.g. `2024-01-02T03:04:05.000Z`.
pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for `#[serde(serialize_with = "iso_millis")]`.
pub fn iso_millis<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(dt))
}
