//! Price history series and their cleaning.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::time::{from_epoch_seconds, iso_millis};

/// One provider sample: epoch seconds and a close price that may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHistoryPoint {
    pub timestamp: i64,
    pub close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    #[serde(serialize_with = "iso_millis")]
    pub time: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySeries {
    pub symbol: String,
    pub range: String,
    pub interval: String,
    pub points: Vec<HistoryPoint>,
}

/// Pairs the provider's parallel timestamp and close arrays, stopping at
/// the shorter one.
pub fn zip_series(timestamps: &[i64], closes: &[Option<f64>]) -> Vec<RawHistoryPoint> {
    timestamps
        .iter()
        .zip(closes)
        .map(|(&timestamp, &close)| RawHistoryPoint { timestamp, close })
        .collect()
}

/// Drops samples without a close price (or with an unrepresentable
/// timestamp) and converts the rest. Input order is kept.
pub fn clean_history(raw: &[RawHistoryPoint]) -> Vec<HistoryPoint> {
    raw.iter()
        .filter_map(|point| {
            let value = point.close?;
            let Some(time) = from_epoch_seconds(point.timestamp) else {
                debug!(timestamp = point.timestamp, "Dropping point with invalid timestamp");
                return None;
            };
            Some(HistoryPoint { time, value })
        })
        .collect()
}

/// Convenience over [`zip_series`] and [`clean_history`].
pub fn normalize_history(timestamps: &[i64], closes: &[Option<f64>]) -> Vec<HistoryPoint> {
    clean_history(&zip_series(timestamps, closes))
}
