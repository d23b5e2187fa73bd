//! Change log entry types.
//!
//! Every mutation produced by reconciliation or a push is recorded as one
//! append-only change log row. The row's `change_type` column holds one of
//! the strings below.

use serde::{Deserialize, Serialize};

/// Kind of mutation a change log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    CampaignAdded,
    CampaignRemoved,
    CampaignUpdated,
    LeadAdded,
    LeadRemoved,
    LeadUpdated,
    CompanyCountChanged,
    PushAll,
    PushNew,
}

impl ChangeType {
    /// Return the type name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignAdded => "campaign_added",
            Self::CampaignRemoved => "campaign_removed",
            Self::CampaignUpdated => "campaign_updated",
            Self::LeadAdded => "lead_added",
            Self::LeadRemoved => "lead_removed",
            Self::LeadUpdated => "lead_updated",
            Self::CompanyCountChanged => "company_count_changed",
            Self::PushAll => "push_all",
            Self::PushNew => "push_new",
        }
    }

    /// Parse a stored type name. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "campaign_added" => Some(Self::CampaignAdded),
            "campaign_removed" => Some(Self::CampaignRemoved),
            "campaign_updated" => Some(Self::CampaignUpdated),
            "lead_added" => Some(Self::LeadAdded),
            "lead_removed" => Some(Self::LeadRemoved),
            "lead_updated" => Some(Self::LeadUpdated),
            "company_count_changed" => Some(Self::CompanyCountChanged),
            "push_all" => Some(Self::PushAll),
            "push_new" => Some(Self::PushNew),
            _ => None,
        }
    }

    /// All valid type names, in the order of the enum.
    pub const ALL: &'static [&'static str] = &[
        "campaign_added",
        "campaign_removed",
        "campaign_updated",
        "lead_added",
        "lead_removed",
        "lead_updated",
        "company_count_changed",
        "push_all",
        "push_new",
    ];
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details line recorded alongside a push entry.
pub fn push_details(companies_count: usize) -> String {
    format!("Pushed {companies_count} companies to webhook")
}
