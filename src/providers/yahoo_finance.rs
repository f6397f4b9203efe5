use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::history::{RawHistoryPoint, zip_series};
use crate::core::market::{MarketDataProvider, ProviderError, RawQuote};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance gateway: batched `v7/finance/quote` plus per-symbol
/// `v8/finance/chart`. Each request is bounded by the client timeout and
/// is never retried.
pub struct YahooFinanceProvider {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("marketboard/1.0")
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;
        Ok(YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::InvalidUrl {
            url: self.base_url.clone(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let url_str = url.to_string();
        debug!("Requesting {}", url_str);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(&url_str, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                url: url_str,
                status: response.status(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.request_error(&url_str, e))?;

        serde_json::from_str(&text).map_err(|source| ProviderError::Decode {
            url: url_str,
            source,
        })
    }

    fn request_error(&self, url: &str, source: reqwest::Error) -> ProviderError {
        if source.is_timeout() {
            ProviderError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            ProviderError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: Option<QuoteResponseBody>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteResponseBody {
    result: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Deserialize, Debug)]
struct ChartQuote {
    close: Option<Vec<Option<f64>>>,
}

/// Reads each record on its own so one malformed quote cannot fail the batch.
/// Reads each record on its own. Field-level problems never drop a record;
/// only non-objects and records without a symbol are skipped.
fn parse_quotes(records: Vec<serde_json::Value>) -> Vec<RawQuote> {
    records
        .into_iter()
        .filter_map(|record| {
            if !record.is_object() {
                warn!(%record, "Skipping quote record that is not an object");
                return None;
            }
            match serde_json::from_value::<RawQuote>(record) {
                Ok(quote) if quote.symbol.is_empty() => {
                    warn!("Skipping quote record without a symbol");
                    None
                }
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable quote record");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self, symbols),
        fields(count = symbols.len())
    )]
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, ProviderError> {
        let mut url = self.endpoint(&["v7", "finance", "quote"])?;
        url.query_pairs_mut()
            .append_pair("symbols", &symbols.join(","));

        let envelope: QuoteEnvelope = self.get_json(url).await?;
        let records = envelope
            .quote_response
            .and_then(|body| body.result)
            .unwrap_or_default();
        debug!(records = records.len(), "Received Yahoo quotes");

        Ok(parse_quotes(records))
    }

    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<RawHistoryPoint>, ProviderError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        url.query_pairs_mut()
            .append_pair("interval", interval)
            .append_pair("range", range);

        let envelope: ChartEnvelope = self.get_json(url).await?;
        let Some(item) = envelope
            .chart
            .and_then(|chart| chart.result)
            .and_then(|items| items.into_iter().next())
        else {
            debug!("No chart result for {}", symbol);
            return Ok(Vec::new());
        };

        let timestamps = item.timestamp.unwrap_or_default();
        let closes = item
            .indicators
            .and_then(|inds| inds.quote.into_iter().next())
            .and_then(|q| q.close)
            .unwrap_or_default();

        Ok(zip_series(&timestamps, &closes))
    }
}
