pub mod campaigns;
pub mod change_log;
pub mod health;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /campaigns                              active campaigns in the store
/// /campaigns/tracked                      live campaigns with company data
/// /campaigns/{id}/push-status             push state (GET)
/// /campaigns/{id}/push-all                push every company (POST)
/// /campaigns/{id}/push-new                push never-pushed companies (POST)
///
/// /change-log                             recent changes (?limit=&campaign_id=)
///
/// /sync                                   run a reconciliation pass (POST)
/// /sync/stats                             dashboard figures
/// /sync/history                           recent sync runs (?limit=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/campaigns", campaigns::router())
        .nest("/change-log", change_log::router())
        .nest("/sync", sync::router())
}
