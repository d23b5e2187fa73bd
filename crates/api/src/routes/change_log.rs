use axum::routing::get;
use axum::Router;

use crate::handlers::change_log;
use crate::state::AppState;

/// Routes mounted at `/change-log`.
///
/// ```text
/// GET    /    -> list_recent   (?limit=&campaign_id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(change_log::list_recent))
}
