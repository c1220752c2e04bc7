//! Loading aggregation input from the document store and persisting the snapshots.

use portal_common::statistics::{
    AggregationInput, AggregationOptions, ChartStatistics, SubmissionRecord, aggregate,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::store::{
    Document, DocumentStore, GroupQuery, StoreError, paths, server_timestamp, to_document,
};

/// Field stamped on both snapshots with the time of the run.
pub const LAST_COMPUTED: &str = "_last_computed";

fn parse_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.iter().map(Document::parse).collect()
}

/// Read every submitted application and its counted sections.
///
/// The four bulk reads run one after another.
pub async fn load_input(store: &dyn DocumentStore) -> Result<AggregationInput, StoreError> {
    let submissions = store
        .collection_group(
            &GroupQuery::new(paths::USER_ITEMS)
                .document(paths::APPLICATION)
                .order_by("_submitted"),
        )
        .await?;
    let demographics = store
        .collection_group(
            &GroupQuery::new(paths::SECTIONS)
                .document(paths::DEMOGRAPHICS)
                .order_by("country"),
        )
        .await?;
    let logistics = store
        .collection_group(
            &GroupQuery::new(paths::SECTIONS)
                .document(paths::LOGISTICS)
                .order_by("need_travel_reimbursement"),
        )
        .await?;
    let referrals = store
        .collection_group(
            &GroupQuery::new(paths::SECTIONS)
                .document(paths::SOCIALS)
                .order_by("referral"),
        )
        .await?;

    Ok(AggregationInput {
        submissions: parse_all::<SubmissionRecord>(submissions)?,
        demographics: parse_all(demographics)?,
        logistics: parse_all(logistics)?,
        referrals: parse_all(referrals)?,
    })
}

/// Recompute both statistics snapshots and return the chart form.
///
/// Nothing is written unless every read and parse succeeds.
#[instrument(skip_all)]
pub async fn generate(
    store: &dyn DocumentStore,
    options: &AggregationOptions,
) -> Result<ChartStatistics, StoreError> {
    let input = load_input(store).await?;
    let stats = aggregate(&input, options);
    let chart = stats.to_chart();

    let computed_at = server_timestamp();
    store
        .set(paths::STATISTICS_RAW, stamped(to_document(&stats)?, &computed_at))
        .await?;
    store
        .set(paths::STATISTICS_CHART, stamped(to_document(&chart)?, &computed_at))
        .await?;

    info!(
        submissions = stats.submissions.total,
        "Statistics snapshots written"
    );
    Ok(chart)
}

/// The stored chart snapshot, if statistics have been generated.
pub async fn load_chart(
    store: &dyn DocumentStore,
) -> Result<Option<Map<String, Value>>, StoreError> {
    Ok(store.get(paths::STATISTICS_CHART).await?.map(|doc| doc.data))
}

fn stamped(mut doc: Map<String, Value>, computed_at: &Value) -> Map<String, Value> {
    doc.insert(LAST_COMPUTED.to_string(), computed_at.clone());
    doc
}
