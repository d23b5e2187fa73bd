//! Snapshot retrieval.
//!
//! Everything a pass needs is fetched up front. A failure anywhere aborts
//! before the store is touched.

use std::collections::BTreeSet;

use leadwatch_core::snapshot::{normalize_leads, select_tracked, unique_companies, TrackedCampaign};
use leadwatch_core::source::{FetchError, SnapshotSource};

/// Fetch every campaign and its leads, keeping those that qualify for
/// tracking.
pub async fn fetch_tracked(source: &dyn SnapshotSource) -> Result<Vec<TrackedCampaign>, FetchError> {
    let campaigns = source.fetch_campaigns().await?;
    let total = campaigns.len();
    let mut tracked = Vec::with_capacity(total);

    for campaign in campaigns {
        let leads = source.fetch_leads(&campaign.id).await?;
        let campaign_id = campaign.id.clone();
        match select_tracked(campaign, leads) {
            Some(t) => tracked.push(t),
            None => tracing::debug!(campaign_id = %campaign_id, "Skipping campaign without enough company data"),
        }
    }

    tracing::debug!(
        source = source.source_name(),
        total,
        tracked = tracked.len(),
        "Fetched snapshot"
    );
    Ok(tracked)
}

/// The campaign's current distinct company names, straight from the source.
pub async fn current_companies(
    source: &dyn SnapshotSource,
    campaign_id: &str,
) -> Result<BTreeSet<String>, FetchError> {
    let leads = source.fetch_leads(campaign_id).await?;
    Ok(unique_companies(&normalize_leads(campaign_id, leads)))
}
