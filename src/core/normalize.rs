//! Maps raw provider quotes into the uniform asset representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::asset::{AssetDescriptor, AssetRegistry, Category};
use crate::core::conversion::ConversionRates;
use crate::core::market::RawQuote;
use crate::core::time::{from_epoch_seconds, iso_millis};

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_EXCHANGE: &str = "N/A";
const DEFAULT_MARKET_STATE: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSet {
    pub usd: Option<f64>,
    pub eur: Option<f64>,
    pub pkr: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketChange {
    pub absolute: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAsset {
    pub symbol: String,
    pub name: String,
    pub category: Category,
    pub currency: String,
    pub exchange: String,
    pub price: PriceSet,
    pub market_change: MarketChange,
    pub market_state: String,
    #[serde(serialize_with = "iso_millis")]
    pub as_of: DateTime<Utc>,
}

/// Normalizes one quote. Never fails: every absent field has a fallback and
/// a missing price or rate propagates as `None`.
///
/// `now` is used as `as_of` when the quote carries no trade time.
pub fn normalize_quote(
    quote: &RawQuote,
    rates: &ConversionRates,
    registry: &AssetRegistry,
    now: DateTime<Utc>,
) -> NormalizedAsset {
    let metadata = registry
        .lookup(&quote.symbol)
        .cloned()
        .unwrap_or_else(|| synthesize_metadata(quote));

    let usd = quote.regular_market_price;

    NormalizedAsset {
        symbol: metadata.symbol,
        name: metadata.name,
        category: metadata.category,
        currency: text_or(&[&quote.currency], DEFAULT_CURRENCY),
        exchange: text_or(
            &[&quote.full_exchange_name, &quote.exchange],
            DEFAULT_EXCHANGE,
        ),
        price: PriceSet {
            usd,
            eur: convert(usd, rates.usd_to_eur),
            pkr: convert(usd, rates.usd_to_pkr),
        },
        market_change: MarketChange {
            absolute: quote.regular_market_change,
            percent: quote.regular_market_change_percent,
        },
        market_state: text_or(&[&quote.market_state], DEFAULT_MARKET_STATE),
        as_of: quote
            .regular_market_time
            .and_then(from_epoch_seconds)
            .unwrap_or(now),
    }
}

fn synthesize_metadata(quote: &RawQuote) -> AssetDescriptor {
    AssetDescriptor {
        symbol: quote.symbol.clone(),
        name: text_or(&[&quote.short_name, &quote.long_name], &quote.symbol),
        category: Category::Uncategorized,
    }
}

fn convert(usd: Option<f64>, rate: Option<f64>) -> Option<f64> {
    Some(usd? * rate?)
}

/// First non-empty candidate, else `default`.
fn text_or(candidates: &[&Option<String>], default: &str) -> String {
    candidates
        .iter()
        .find_map(|c| c.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(default)
        .to_string()
}
