//! Route definitions for the `/sync` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Routes mounted at `/sync`.
///
/// ```text
/// POST   /           -> run_pass
/// GET    /stats      -> stats
/// GET    /history    -> history   (?limit=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sync::run_pass))
        .route("/stats", get(sync::stats))
        .route("/history", get(sync::history))
}
