use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Statistics, counts::Buckets};

/// One bar or slice in a dashboard chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChartPoint {
    #[schema(example = "18-25")]
    pub name: String,
    #[schema(example = 42)]
    pub value: u64,
}

impl ChartPoint {
    pub fn from_buckets(buckets: &Buckets) -> Vec<ChartPoint> {
        buckets
            .iter()
            .map(|(name, value)| ChartPoint {
                name: name.clone(),
                value: *value,
            })
            .collect()
    }
}

/// Submission totals with the per-day histogram flattened for a time-series chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChartSubmissions {
    pub per_day: Vec<ChartPoint>,
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// `null` when nothing has been submitted yet.
    pub approval_rate: Option<f64>,
}

/// Chart-ready form of [`Statistics`]: every bucket map becomes a `{name, value}` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChartStatistics {
    pub submissions: ChartSubmissions,
    #[schema(value_type = Object)]
    pub demographics: IndexMap<String, Vec<ChartPoint>>,
    #[schema(value_type = Object)]
    pub logistics: IndexMap<String, Vec<ChartPoint>>,
    #[schema(value_type = Object)]
    pub referral: IndexMap<String, Vec<ChartPoint>>,
}

impl From<&Statistics> for ChartStatistics {
    fn from(stats: &Statistics) -> Self {
        Self {
            submissions: ChartSubmissions {
                per_day: ChartPoint::from_buckets(&stats.submissions.per_day),
                total: stats.submissions.total,
                accepted: stats.submissions.accepted,
                rejected: stats.submissions.rejected,
                approval_rate: stats.submissions.approval_rate,
            },
            demographics: stats.demographics.to_chart(),
            logistics: stats.logistics.to_chart(),
            referral: stats.referral.to_chart(),
        }
    }
}
