//! Campaign model.

use leadwatch_core::snapshot::CampaignSnapshot;
use leadwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    pub is_active: bool,
}

impl Campaign {
    /// The diffed fields of this row, for comparison with a new snapshot.
    pub fn to_snapshot(&self) -> CampaignSnapshot {
        CampaignSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status.clone(),
        }
    }
}
