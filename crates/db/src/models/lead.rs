//! Lead model.

use leadwatch_core::snapshot::LeadSnapshot;
use leadwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `leads` table. Keyed by `(campaign_id, id)`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lead {
    pub campaign_id: String,
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub state: Option<String>,
    pub state_system: Option<String>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    pub is_active: bool,
}

impl Lead {
    /// The diffed fields of this row, for comparison with a new snapshot.
    pub fn to_snapshot(&self) -> LeadSnapshot {
        LeadSnapshot {
            id: self.id.clone(),
            campaign_id: self.campaign_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company_name: self.company_name.clone(),
            job_title: self.job_title.clone(),
            linkedin_url: self.linkedin_url.clone(),
            state: self.state.clone(),
            state_system: self.state_system.clone(),
        }
    }
}
