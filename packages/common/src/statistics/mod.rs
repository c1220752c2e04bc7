//! Dashboard statistics over submitted applications.
//!
//! [`aggregate`] is a pure function from query results to a [`Statistics`]
//! snapshot; persisting the snapshot and its [`ChartStatistics`] form is left to
//! the caller.

mod aggregate;
mod chart;
mod counts;

pub mod normalize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationStatus, Demographics, Logistics, Socials};

pub use aggregate::{
    DEMOGRAPHIC_CATEGORIES, LOGISTIC_CATEGORIES, REFERRAL_CATEGORIES, aggregate,
    tally_demographics, tally_logistics, tally_referrals, tally_submissions,
};
pub use chart::{ChartPoint, ChartStatistics, ChartSubmissions};
pub use counts::{Buckets, CategoryCounts};

/// The slice of an application document the submission summary needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub status: ApplicationStatus,
    #[serde(rename = "_submitted")]
    pub submitted_at: DateTime<Utc>,
}

/// Everything one aggregation run reads, as returned by the bulk queries.
#[derive(Clone, Debug, Default)]
pub struct AggregationInput {
    /// Application documents, ordered by submission time.
    pub submissions: Vec<SubmissionRecord>,
    pub demographics: Vec<Demographics>,
    pub logistics: Vec<Logistics>,
    /// Socials sections; only the referral answer is counted.
    pub referrals: Vec<Socials>,
}

/// Knobs that vary per event rather than per run.
#[derive(Clone, Debug, Default)]
pub struct AggregationOptions {
    /// School name counted as "Affiliated" in `school_affiliation`.
    pub host_institution: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmissionSummary {
    /// Submissions per calendar day, keyed `MM-DD-YYYY`.
    #[schema(value_type = Object)]
    pub per_day: Buckets,
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// accepted / total, or `null` when there are no submissions.
    pub approval_rate: Option<f64>,
}

/// Nested-count snapshot of every statistic category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Statistics {
    pub submissions: SubmissionSummary,
    #[schema(value_type = Object)]
    pub demographics: CategoryCounts,
    #[schema(value_type = Object)]
    pub logistics: CategoryCounts,
    #[schema(value_type = Object)]
    pub referral: CategoryCounts,
}

impl Statistics {
    pub fn to_chart(&self) -> ChartStatistics {
        ChartStatistics::from(self)
    }
}
