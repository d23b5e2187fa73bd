//! Wire shapes of the Lemlist API.

use leadwatch_core::snapshot::{CampaignSnapshot, LeadSnapshot};
use serde::Deserialize;

/// A campaign from `GET /campaigns?version=v2`.
#[derive(Debug, Clone, Deserialize)]
pub struct LemlistCampaign {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl LemlistCampaign {
    pub fn into_snapshot(self) -> CampaignSnapshot {
        CampaignSnapshot {
            id: self.id,
            name: self.name,
            status: self.status.unwrap_or_default(),
        }
    }
}

/// One page of the campaign listing.
#[derive(Debug, Deserialize)]
pub struct CampaignPage {
    #[serde(default)]
    pub campaigns: Vec<LemlistCampaign>,
}

/// A lead from `GET /campaigns/{id}/export/leads?format=json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LemlistLead {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub state: Option<String>,
    pub state_system: Option<String>,
}

impl LemlistLead {
    pub fn into_snapshot(self, campaign_id: &str) -> LeadSnapshot {
        LeadSnapshot {
            id: self.id,
            campaign_id: campaign_id.to_string(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            company_name: self.company_name,
            job_title: self.job_title,
            linkedin_url: self.linkedin_url,
            state: self.state,
            state_system: self.state_system,
        }
    }
}

/// The lead export answers with a bare list, a `{"leads": [...]}` wrapper,
/// the object itself for a single lead, or `null` for none. Any other body
/// is a decode error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LeadExport {
    List(Vec<LemlistLead>),
    Wrapped { leads: Vec<LemlistLead> },
    Single(LemlistLead),
    Empty,
}

impl LeadExport {
    pub fn into_leads(self) -> Vec<LemlistLead> {
        match self {
            Self::List(leads) | Self::Wrapped { leads } => leads,
            Self::Single(lead) => vec![lead],
            Self::Empty => Vec::new(),
        }
    }
}
