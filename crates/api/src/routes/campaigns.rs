//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /                    -> list_active
/// GET    /tracked             -> list_tracked
/// GET    /{id}/push-status    -> push_status
/// POST   /{id}/push-all       -> push_all
/// POST   /{id}/push-new       -> push_new
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list_active))
        .route("/tracked", get(campaigns::list_tracked))
        .route("/{id}/push-status", get(campaigns::push_status))
        .route("/{id}/push-all", post(campaigns::push_all))
        .route("/{id}/push-new", post(campaigns::push_new))
}
