//! Change log entity models and DTOs.
//!
//! Change log rows are immutable once written; the table rejects UPDATE
//! and DELETE. Old and new values are stored as text: counts for
//! `company_count_changed`, JSON objects for the `*_updated` types.

use leadwatch_core::change_log::ChangeType;
use leadwatch_core::snapshot::{CampaignSnapshot, LeadSnapshot};
use leadwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A single change log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeLogEntry {
    pub id: DbId,
    pub change_type: String,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub lead_id: Option<String>,
    pub lead_email: Option<String>,
    pub lead_company: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub details: Option<String>,
    pub change_timestamp: Timestamp,
}

impl ChangeLogEntry {
    /// Parsed change type. `None` only if the CHECK constraint was relaxed.
    pub fn kind(&self) -> Option<ChangeType> {
        ChangeType::from_str(&self.change_type)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for appending a change log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateChangeLogEntry {
    pub change_type: ChangeType,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub lead_id: Option<String>,
    pub lead_email: Option<String>,
    pub lead_company: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub details: Option<String>,
}

impl CreateChangeLogEntry {
    /// An entry with only the change type set.
    pub fn new(change_type: ChangeType) -> Self {
        Self {
            change_type,
            campaign_id: None,
            campaign_name: None,
            lead_id: None,
            lead_email: None,
            lead_company: None,
            old_value: None,
            new_value: None,
            details: None,
        }
    }

    /// A campaign-scoped entry.
    pub fn campaign(change_type: ChangeType, campaign_id: &str, campaign_name: &str) -> Self {
        Self {
            campaign_id: Some(campaign_id.to_string()),
            campaign_name: Some(campaign_name.to_string()),
            ..Self::new(change_type)
        }
    }

    /// A campaign-scoped entry built from a snapshot.
    pub fn for_campaign(change_type: ChangeType, campaign: &CampaignSnapshot) -> Self {
        Self::campaign(change_type, &campaign.id, &campaign.name)
    }

    /// Scope the entry to a lead. Copies the lead's id, email and company.
    pub fn with_lead(mut self, lead: &LeadSnapshot) -> Self {
        self.lead_id = Some(lead.id.clone());
        self.lead_email = lead.email.clone();
        self.lead_company = lead.company_name.clone();
        self
    }

    pub fn with_values(mut self, old_value: impl ToString, new_value: impl ToString) -> Self {
        self.old_value = Some(old_value.to_string());
        self.new_value = Some(new_value.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing change log entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLogQuery {
    pub limit: Option<i64>,
    pub campaign_id: Option<String>,
}
