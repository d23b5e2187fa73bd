//! Handlers for the `/sync` resource.

use axum::extract::{Query, State};
use axum::Json;
use leadwatch_db::models::sync_run::{SyncRun, SyncStats};
use leadwatch_db::repositories::{CampaignRepo, ChangeLogRepo, LeadRepo, SyncRunRepo};
use leadwatch_sync::PassReport;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sync
///
/// Run one reconciliation pass now. A pass already in progress (from the
/// worker or another request) is waited for, not interleaved.
pub async fn run_pass(State(state): State<AppState>) -> AppResult<Json<DataResponse<PassReport>>> {
    let report = state.reconciler.run_pass(state.source.as_ref()).await?;
    tracing::debug!(sync_run_id = report.sync_run_id, "Manual sync pass finished");
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/sync/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<SyncStats>>> {
    let stats = SyncStats {
        active_campaigns: CampaignRepo::count_active(&state.pool).await?,
        active_leads: LeadRepo::count_active(&state.pool).await?,
        total_changes: ChangeLogRepo::count(&state.pool).await?,
        last_sync: SyncRunRepo::find_latest(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/sync/history
///
/// Recent sync runs, newest first. `?limit=` defaults to 20 (max 100).
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<SyncRun>>>> {
    let runs = SyncRunRepo::list_recent(&state.pool, params.limit).await?;
    Ok(Json(DataResponse { data: runs }))
}
