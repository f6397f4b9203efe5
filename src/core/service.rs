//! Snapshot and history pipelines over a market data provider.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::core::aggregate::{Snapshot, group_by_category};
use crate::core::asset::AssetRegistry;
use crate::core::conversion::ConversionRates;
use crate::core::history::{HistorySeries, clean_history};
use crate::core::market::{MarketDataProvider, ProviderError};
use crate::core::normalize::normalize_quote;

pub const DEFAULT_RANGE: &str = "1d";
pub const DEFAULT_INTERVAL: &str = "5m";

/// Stateless request handling: every call builds its result from scratch
/// and only shares the read-only registry.
#[derive(Clone)]
pub struct MarketService {
    registry: Arc<AssetRegistry>,
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketService {
    pub fn new(registry: Arc<AssetRegistry>, provider: Arc<dyn MarketDataProvider>) -> Self {
        MarketService { registry, provider }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Fetches all catalog symbols in one batch and aggregates them. Fails
    /// only when the batch request itself fails.
    #[instrument(name = "Snapshot", skip(self))]
    pub async fn snapshot(&self) -> Result<Snapshot, ProviderError> {
        let symbols = self.registry.all_symbols();
        let quotes = self.provider.fetch_quotes(&symbols).await?;
        debug!(
            requested = symbols.len(),
            received = quotes.len(),
            "Fetched quotes"
        );

        let generated_at = Utc::now();
        let conversion_rates = ConversionRates::from_quotes(&quotes);
        let data = group_by_category(
            quotes
                .iter()
                .map(|q| normalize_quote(q, &conversion_rates, &self.registry, generated_at)),
        );

        info!(categories = data.len(), "Built market snapshot");
        Ok(Snapshot {
            generated_at,
            conversion_rates,
            data,
        })
    }

    #[instrument(name = "History", skip(self))]
    pub async fn history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<HistorySeries, ProviderError> {
        let raw = self.provider.fetch_history(symbol, range, interval).await?;
        let points = clean_history(&raw);
        debug!(raw = raw.len(), kept = points.len(), "Cleaned history");

        Ok(HistorySeries {
            symbol: symbol.to_string(),
            range: range.to_string(),
            interval: interval.to_string(),
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::Category;
    use crate::core::history::RawHistoryPoint;
    use crate::core::market::RawQuote;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        quotes: Vec<RawQuote>,
        history: Vec<RawHistoryPoint>,
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, ProviderError> {
            self.requested.lock().unwrap().extend(symbols.iter().cloned());
            if self.fail {
                return Err(ProviderError::InvalidUrl {
                    url: "fake".to_string(),
                });
            }
            Ok(self.quotes.clone())
        }

        async fn fetch_history(
            &self,
            symbol: &str,
            range: &str,
            interval: &str,
        ) -> Result<Vec<RawHistoryPoint>, ProviderError> {
            self.requested
                .lock()
                .unwrap()
                .push(format!("{symbol}:{range}:{interval}"));
            if self.fail {
                return Err(ProviderError::InvalidUrl {
                    url: "fake".to_string(),
                });
            }
            Ok(self.history.clone())
        }
    }

    fn quote(symbol: &str, price: f64) -> RawQuote {
        RawQuote {
            symbol: symbol.to_string(),
            regular_market_price: Some(price),
            ..Default::default()
        }
    }

    fn service(provider: Arc<FakeProvider>) -> MarketService {
        MarketService::new(Arc::new(AssetRegistry::default()), provider)
    }

    #[tokio::test]
    async fn test_snapshot_requests_all_catalog_symbols() {
        let provider = Arc::new(FakeProvider::default());
        service(provider.clone()).snapshot().await.unwrap();
        assert_eq!(
            *provider.requested.lock().unwrap(),
            AssetRegistry::default().all_symbols()
        );
    }

    #[tokio::test]
    async fn test_snapshot_pipeline() {
        let provider = Arc::new(FakeProvider {
            quotes: vec![
                quote("AAPL", 200.0),
                quote("EURUSD=X", 0.8),
                quote("XOM", 110.0),
                quote("USDPKR=X", 280.0),
                quote("MSFT", 400.0),
            ],
            ..Default::default()
        });
        let snapshot = service(provider).snapshot().await.unwrap();

        assert_eq!(snapshot.conversion_rates.usd_to_eur, Some(1.0 / 0.8));
        assert_eq!(snapshot.conversion_rates.usd_to_pkr, Some(280.0));
        assert_eq!(snapshot.data.len(), 3);

        let stocks = &snapshot.data[&Category::Stocks];
        assert_eq!(stocks[0].symbol, "AAPL");
        assert_eq!(stocks[1].symbol, "MSFT");
        assert_eq!(stocks[0].price.eur, Some(200.0 * (1.0 / 0.8)));
        assert_eq!(stocks[0].price.pkr, Some(200.0 * 280.0));
        assert_eq!(stocks[0].as_of, snapshot.generated_at);

        assert_eq!(snapshot.data[&Category::Forex].len(), 2);
        assert_eq!(snapshot.data[&Category::Uncategorized][0].name, "XOM");
    }

    #[tokio::test]
    async fn test_empty_provider_result_is_not_an_error() {
        let provider = Arc::new(FakeProvider::default());
        let snapshot = service(provider).snapshot().await.unwrap();
        assert!(snapshot.data.is_empty());
        assert_eq!(snapshot.conversion_rates, ConversionRates::default());
    }

    #[tokio::test]
    async fn test_provider_failure_fails_snapshot() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..Default::default()
        });
        assert!(service(provider).snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_history_pipeline() {
        let provider = Arc::new(FakeProvider {
            history: vec![
                RawHistoryPoint {
                    timestamp: 1_704_164_645,
                    close: Some(10.0),
                },
                RawHistoryPoint {
                    timestamp: 1_704_164_945,
                    close: None,
                },
            ],
            ..Default::default()
        });
        let series = service(provider.clone())
            .history("BTC-USD", "5d", "1h")
            .await
            .unwrap();

        assert_eq!(series.symbol, "BTC-USD");
        assert_eq!(series.range, "5d");
        assert_eq!(series.interval, "1h");
        assert_eq!(series.points.len(), 1);
        assert_eq!(
            *provider.requested.lock().unwrap(),
            vec!["BTC-USD:5d:1h".to_string()]
        );
    }
}
