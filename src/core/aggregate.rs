//! Groups normalized assets into the snapshot shape.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::asset::Category;
use crate::core::conversion::ConversionRates;
use crate::core::normalize::NormalizedAsset;
use crate::core::time::iso_millis;

pub type CategoryBuckets = BTreeMap<Category, Vec<NormalizedAsset>>;

/// Point-in-time view of all tracked instruments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(serialize_with = "iso_millis")]
    pub generated_at: DateTime<Utc>,
    pub conversion_rates: ConversionRates,
    pub data: CategoryBuckets,
}

/// Partitions assets by category, keeping arrival order inside each bucket.
/// Categories without members have no key at all.
pub fn group_by_category(assets: impl IntoIterator<Item = NormalizedAsset>) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::new();
    for asset in assets {
        buckets.entry(asset.category).or_default().push(asset);
    }
    buckets
}
