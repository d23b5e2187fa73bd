//! Handlers for the `/campaigns` resource.
//!
//! Company sets are always read live from the snapshot source; the store
//! only contributes the pushed set and the campaign's identity.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::Json;
use leadwatch_core::error::CoreError;
use leadwatch_core::push::{PushOutcome, PushStatus};
use leadwatch_db::models::campaign::Campaign;
use leadwatch_db::repositories::CampaignRepo;
use leadwatch_sync::fetch::{current_companies, fetch_tracked};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A live campaign that passed the tracking guard.
#[derive(Debug, Serialize)]
pub struct TrackedCampaignSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    pub lead_count: usize,
    pub unique_company_count: usize,
    pub companies: BTreeSet<String>,
}

/// Push state plus the campaign it belongs to.
#[derive(Debug, Serialize)]
pub struct CampaignPushStatus {
    pub campaign_id: String,
    #[serde(flatten)]
    pub status: PushStatus,
}

/// GET /api/v1/campaigns
///
/// Active campaigns as last reconciled.
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let campaigns = CampaignRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/campaigns/tracked
///
/// Campaigns at the source with at least two distinct companies. Reads the
/// source directly and writes nothing.
pub async fn list_tracked(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TrackedCampaignSummary>>>> {
    let tracked = fetch_tracked(state.source.as_ref()).await?;
    let data = tracked
        .into_iter()
        .map(|t| TrackedCampaignSummary {
            lead_count: t.leads.len(),
            unique_company_count: t.unique_company_count(),
            id: t.campaign.id,
            name: t.campaign.name,
            status: t.campaign.status,
            companies: t.companies,
        })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/campaigns/{id}/push-status
pub async fn push_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CampaignPushStatus>>> {
    let current = live_companies(&state, &id).await?;
    let status = state.push_tracker.status(&id, &current).await?;
    Ok(Json(DataResponse {
        data: CampaignPushStatus {
            campaign_id: id,
            status,
        },
    }))
}

/// POST /api/v1/campaigns/{id}/push-all
///
/// Deliver every current company. Returns 422 with `NO_COMPANY_DATA` when
/// the campaign has no company names.
pub async fn push_all(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<PushOutcome>>> {
    let current = live_companies(&state, &id).await?;
    let outcome = state
        .push_tracker
        .push_all(&id, &current, state.notifier.as_ref())
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/campaigns/{id}/push-new
///
/// Deliver only companies never pushed for this campaign. Returns 422 with
/// `NO_NEW_COMPANIES` when there is nothing new.
pub async fn push_new(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<PushOutcome>>> {
    let current = live_companies(&state, &id).await?;
    let outcome = state
        .push_tracker
        .push_new(&id, &current, state.notifier.as_ref())
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// The campaign's current company set. The campaign must be active in the
/// store.
async fn live_companies(state: &AppState, id: &str) -> Result<BTreeSet<String>, AppError> {
    let campaign = CampaignRepo::find_by_id(&state.pool, id).await?;
    if !campaign.is_some_and(|c| c.is_active) {
        return Err(CoreError::NotFound {
            entity: "Campaign",
            id: id.to_string(),
        }
        .into());
    }
    Ok(current_companies(state.source.as_ref(), id).await?)
}
