//! Market data provider abstractions

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::core::history::RawHistoryPoint;

/// Quote record as returned by the provider. Every field is optional, and a
/// field of the wrong type reads as absent instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuote {
    #[serde(deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub short_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub long_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub regular_market_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub regular_market_change: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub regular_market_change_percent: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub full_exchange_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub exchange: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub market_state: Option<String>,
    /// Last trade time in epoch seconds. Fractional seconds are truncated.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub regular_market_time: Option<i64>,
}

/// Field decoders that never fail. Yahoo sometimes wraps numbers as
/// `{"raw": 1.0, "fmt": "1.00"}`; the `raw` value is used.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn read<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(mut map) => map.remove("raw").unwrap_or(Value::Null),
            other => other,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match read(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = match read(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(value.filter(|v| v.is_finite()))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = match read(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
            _ => None,
        };
        Ok(value)
    }

    fn truncate(v: f64) -> Option<i64> {
        // `as` saturates; out-of-range times are rejected later.
        v.is_finite().then_some(v.trunc() as i64)
    }
}

/// Failure talking to the external market data provider.
///
/// A well-formed response without data is not an error; gateways return
/// empty sequences for it.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Request error: {source} for URL: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for URL: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse provider response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid provider URL: {url}")]
    InvalidUrl { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches quotes for all `symbols` in a single batched request.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, ProviderError>;

    /// Fetches the close-price series of one symbol.
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<RawHistoryPoint>, ProviderError>;
}
