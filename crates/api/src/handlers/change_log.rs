use axum::extract::{Query, State};
use axum::Json;
use leadwatch_db::models::change_log::{ChangeLogEntry, ChangeLogQuery};
use leadwatch_db::repositories::ChangeLogRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/change-log
///
/// Most recent entries first. `?limit=` defaults to 50 (max 500);
/// `?campaign_id=` restricts to one campaign.
pub async fn list_recent(
    State(state): State<AppState>,
    Query(params): Query<ChangeLogQuery>,
) -> AppResult<Json<DataResponse<Vec<ChangeLogEntry>>>> {
    if params.campaign_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(AppError::BadRequest("campaign_id must not be empty".into()));
    }
    let entries = ChangeLogRepo::list_recent(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}
