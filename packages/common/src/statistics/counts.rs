use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::chart::ChartPoint;

/// Occurrences of each bucket within one category, in first-seen order.
pub type Buckets = IndexMap<String, u64>;

/// Ordered mapping of category -> bucket -> count.
///
/// Categories are declared up front so a snapshot always carries every key, even
/// when no document contributed to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts(IndexMap<String, Buckets>);

impl CategoryCounts {
    pub fn with_categories(categories: &[&str]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.to_string(), Buckets::new()))
                .collect(),
        )
    }

    /// Count one occurrence of `bucket` under `category`.
    pub fn increment(&mut self, category: &str, bucket: impl Into<String>) {
        *self
            .0
            .entry(category.to_string())
            .or_default()
            .entry(bucket.into())
            .or_insert(0) += 1;
    }

    pub fn category(&self, category: &str) -> Option<&Buckets> {
        self.0.get(category)
    }

    /// Count recorded for a bucket, zero when absent.
    pub fn get(&self, category: &str, bucket: &str) -> u64 {
        self.0
            .get(category)
            .and_then(|b| b.get(bucket))
            .copied()
            .unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Flatten each category into `{name, value}` points for chart rendering.
    pub fn to_chart(&self) -> IndexMap<String, Vec<ChartPoint>> {
        self.0
            .iter()
            .map(|(category, buckets)| (category.clone(), ChartPoint::from_buckets(buckets)))
            .collect()
    }
}
