//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for list endpoints. Clamped in the repository layer via
/// `clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
