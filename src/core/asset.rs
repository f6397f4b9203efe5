//! Static instrument catalog and symbol lookup.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Symbol of the EUR/USD pair used to derive the USD to EUR factor.
pub const EUR_USD_SYMBOL: &str = "EURUSD=X";
/// Symbol of the USD/PKR pair used as the USD to PKR factor.
pub const USD_PKR_SYMBOL: &str = "USDPKR=X";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stocks,
    Metals,
    Crypto,
    Forex,
    /// Provider returned a symbol that is not in the catalog.
    Uncategorized,
}

impl Category {
    /// Categories an instrument in the catalog can belong to.
    pub const TRACKED: [Category; 4] = [
        Category::Stocks,
        Category::Metals,
        Category::Crypto,
        Category::Forex,
    ];
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Stocks => "stocks",
                Category::Metals => "metals",
                Category::Crypto => "crypto",
                Category::Forex => "forex",
                Category::Uncategorized => "uncategorized",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    pub symbol: String,
    pub name: String,
    pub category: Category,
}

impl AssetDescriptor {
    pub fn new(symbol: &str, name: &str, category: Category) -> Self {
        AssetDescriptor {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category,
        }
    }
}

/// Catalog entry as served by the config endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: String,
    pub name: String,
}

/// Read-only catalog of tracked instruments.
///
/// Built once at start-up and shared behind an `Arc`; nothing mutates it
/// afterwards, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: Vec<AssetDescriptor>,
    by_symbol: HashMap<String, usize>,
}

impl AssetRegistry {
    /// Builds a registry, rejecting symbols that appear more than once.
    pub fn new(assets: Vec<AssetDescriptor>) -> Result<Self> {
        let mut by_symbol = HashMap::with_capacity(assets.len());
        for (index, asset) in assets.iter().enumerate() {
            if asset.category == Category::Uncategorized {
                bail!(
                    "Catalog entry {} cannot use the uncategorized category",
                    asset.symbol
                );
            }
            if by_symbol.insert(asset.symbol.clone(), index).is_some() {
                bail!("Duplicate symbol in catalog: {}", asset.symbol);
            }
        }
        Ok(AssetRegistry { assets, by_symbol })
    }

    /// Builds a registry from per-category `{symbol, name}` lists.
    pub fn from_catalog(catalog: &BTreeMap<Category, Vec<CatalogEntry>>) -> Result<Self> {
        let assets = catalog
            .iter()
            .flat_map(|(category, entries)| {
                entries
                    .iter()
                    .map(|e| AssetDescriptor::new(&e.symbol, &e.name, *category))
            })
            .collect();
        Self::new(assets)
    }

    /// All symbols in catalog order, used for the batched quote request.
    pub fn all_symbols(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.symbol.clone()).collect()
    }

    pub fn lookup(&self, symbol: &str) -> Option<&AssetDescriptor> {
        self.by_symbol.get(symbol).map(|&i| &self.assets[i])
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Catalog grouped by category. Every tracked category is present,
    /// even when it has no instruments.
    pub fn catalog(&self) -> BTreeMap<Category, Vec<CatalogEntry>> {
        let mut catalog: BTreeMap<Category, Vec<CatalogEntry>> = Category::TRACKED
            .iter()
            .map(|c| (*c, Vec::new()))
            .collect();
        for asset in &self.assets {
            catalog.entry(asset.category).or_default().push(CatalogEntry {
                symbol: asset.symbol.clone(),
                name: asset.name.clone(),
            });
        }
        catalog
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        let assets = vec![
            AssetDescriptor::new("AAPL", "Apple", Category::Stocks),
            AssetDescriptor::new("MSFT", "Microsoft", Category::Stocks),
            AssetDescriptor::new("GOOGL", "Alphabet", Category::Stocks),
            AssetDescriptor::new("TSLA", "Tesla", Category::Stocks),
            AssetDescriptor::new("NVDA", "NVIDIA", Category::Stocks),
            AssetDescriptor::new("AMZN", "Amazon", Category::Stocks),
            AssetDescriptor::new("GC=F", "Gold Futures", Category::Metals),
            AssetDescriptor::new("SI=F", "Silver Futures", Category::Metals),
            AssetDescriptor::new("BTC-USD", "Bitcoin", Category::Crypto),
            AssetDescriptor::new("ETH-USD", "Ethereum", Category::Crypto),
            AssetDescriptor::new("SOL-USD", "Solana", Category::Crypto),
            AssetDescriptor::new("BNB-USD", "BNB", Category::Crypto),
            AssetDescriptor::new(EUR_USD_SYMBOL, "EUR / USD", Category::Forex),
            AssetDescriptor::new(USD_PKR_SYMBOL, "USD / PKR", Category::Forex),
            AssetDescriptor::new("EURPKR=X", "EUR / PKR", Category::Forex),
            AssetDescriptor::new("GBPUSD=X", "GBP / USD", Category::Forex),
        ];
        let by_symbol = assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.symbol.clone(), i))
            .collect();
        AssetRegistry { assets, by_symbol }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_matching_symbol() {
        let registry = AssetRegistry::default();
        for symbol in registry.all_symbols() {
            let asset = registry.lookup(&symbol).expect("registered symbol");
            assert_eq!(asset.symbol, symbol);
        }
    }

    #[test]
    fn test_builtin_catalog_layout() {
        let registry = AssetRegistry::default();
        assert_eq!(registry.len(), 16);
        assert_eq!(registry.all_symbols()[0], "AAPL");
        assert_eq!(registry.all_symbols()[15], "GBPUSD=X");

        let gold = registry.lookup("GC=F").unwrap();
        assert_eq!(gold.name, "Gold Futures");
        assert_eq!(gold.category, Category::Metals);

        assert!(registry.lookup("XOM").is_none());
    }

    #[test]
    fn test_catalog_groups_by_category() {
        let catalog = AssetRegistry::default().catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog[&Category::Stocks].len(), 6);
        assert_eq!(catalog[&Category::Metals].len(), 2);
        assert_eq!(catalog[&Category::Crypto].len(), 4);
        assert_eq!(catalog[&Category::Forex].len(), 4);
        assert_eq!(
            catalog[&Category::Forex][1],
            CatalogEntry {
                symbol: "USDPKR=X".to_string(),
                name: "USD / PKR".to_string()
            }
        );
    }

    #[test]
    fn test_catalog_keeps_empty_categories() {
        let registry =
            AssetRegistry::new(vec![AssetDescriptor::new("AAPL", "Apple", Category::Stocks)])
                .unwrap();
        let catalog = registry.catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog[&Category::Crypto].is_empty());
    }

    #[test]
    fn test_duplicate_symbols_rejected() {
        let result = AssetRegistry::new(vec![
            AssetDescriptor::new("AAPL", "Apple", Category::Stocks),
            AssetDescriptor::new("AAPL", "Apple again", Category::Crypto),
        ]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Duplicate symbol in catalog: AAPL"
        );
    }

    #[test]
    fn test_uncategorized_catalog_entry_rejected() {
        let result = AssetRegistry::new(vec![AssetDescriptor::new(
            "XOM",
            "Exxon",
            Category::Uncategorized,
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_catalog() {
        let mut catalog = BTreeMap::new();
        catalog.insert(
            Category::Crypto,
            vec![CatalogEntry {
                symbol: "DOGE-USD".to_string(),
                name: "Dogecoin".to_string(),
            }],
        );
        let registry = AssetRegistry::from_catalog(&catalog).unwrap();
        assert_eq!(registry.all_symbols(), vec!["DOGE-USD".to_string()]);
        assert_eq!(
            registry.lookup("DOGE-USD").unwrap().category,
            Category::Crypto
        );
    }

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Uncategorized).unwrap(),
            "\"uncategorized\""
        );
        assert_eq!(Category::Metals.to_string(), "metals");
    }
}
