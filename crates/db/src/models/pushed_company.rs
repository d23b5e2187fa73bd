//! Pushed company model.

use leadwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pushed_companies` table. Immutable once created.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PushedCompany {
    pub id: DbId,
    pub campaign_id: String,
    pub company_name: String,
    pub pushed_at: Timestamp,
}
