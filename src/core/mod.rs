//! Core market data abstractions and the aggregation pipeline

pub mod aggregate;
pub mod asset;
pub mod config;
pub mod conversion;
pub mod history;
pub mod log;
pub mod market;
pub mod normalize;
pub mod service;
pub mod time;

// Re-export main types for cleaner imports
pub use aggregate::{Snapshot, group_by_category};
pub use asset::{AssetDescriptor, AssetRegistry, Category};
pub use conversion::ConversionRates;
pub use history::{HistoryPoint, HistorySeries, RawHistoryPoint};
pub use market::{MarketDataProvider, ProviderError, RawQuote};
pub use normalize::{MarketChange, NormalizedAsset, PriceSet, normalize_quote};
pub use service::MarketService;
