//! Cross-currency conversion factors derived from forex quotes.

use serde::Serialize;

use crate::core::asset::{EUR_USD_SYMBOL, USD_PKR_SYMBOL};
use crate::core::market::RawQuote;

/// Multiplicative factors converting a USD price into EUR and PKR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRates {
    pub usd_to_eur: Option<f64>,
    pub usd_to_pkr: Option<f64>,
}

impl ConversionRates {
    /// Derives the rates from the designated currency pair quotes.
    ///
    /// `usd_to_eur` is the reciprocal of the EUR/USD price while `usd_to_pkr`
    /// is the USD/PKR price as quoted. A missing, zero or non-finite price
    /// leaves the corresponding rate unset.
    pub fn from_quotes(quotes: &[RawQuote]) -> Self {
        let usd_to_eur = pair_price(quotes, EUR_USD_SYMBOL).map(|eur_usd| 1.0 / eur_usd);
        let usd_to_pkr = pair_price(quotes, USD_PKR_SYMBOL);
        ConversionRates {
            usd_to_eur,
            usd_to_pkr,
        }
    }
}

fn pair_price(quotes: &[RawQuote], symbol: &str) -> Option<f64> {
    quotes
        .iter()
        .find(|q| q.symbol == symbol)
        .and_then(|q| q.regular_market_price)
        .filter(|price| price.is_finite() && *price != 0.0)
}
