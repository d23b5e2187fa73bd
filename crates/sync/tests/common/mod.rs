//! In-memory collaborators for engine tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use leadwatch_core::notify::{CompanyNotifier, CompanyPush, NotifyError};
use leadwatch_core::snapshot::{CampaignSnapshot, LeadSnapshot};
use leadwatch_core::source::{FetchError, SnapshotSource};

pub fn campaign(id: &str, name: &str) -> CampaignSnapshot {
    CampaignSnapshot {
        id: id.to_string(),
        name: name.to_string(),
        status: "running".to_string(),
    }
}

pub fn lead(id: &str, company: Option<&str>) -> LeadSnapshot {
    LeadSnapshot {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        first_name: Some("Lead".to_string()),
        last_name: Some(id.to_string()),
        company_name: company.map(str::to_string),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Snapshot source
// ---------------------------------------------------------------------------

/// A source whose campaigns and leads are set by the test.
#[derive(Default)]
pub struct MockSource {
    campaigns: Mutex<Vec<CampaignSnapshot>>,
    leads: Mutex<HashMap<String, Vec<LeadSnapshot>>>,
    failing: Mutex<Option<String>>,
}

impl MockSource {
    pub fn set_campaign(&self, campaign: CampaignSnapshot, leads: Vec<LeadSnapshot>) {
        let mut campaigns = self.campaigns.lock().unwrap();
        campaigns.retain(|c| c.id != campaign.id);
        self.leads.lock().unwrap().insert(campaign.id.clone(), leads);
        campaigns.push(campaign);
    }

    pub fn remove_campaign(&self, id: &str) {
        self.campaigns.lock().unwrap().retain(|c| c.id != id);
        self.leads.lock().unwrap().remove(id);
    }

    /// Make lead fetches for `campaign_id` fail with a 503.
    pub fn fail_leads_for(&self, campaign_id: &str) {
        *self.failing.lock().unwrap() = Some(campaign_id.to_string());
    }
}

#[async_trait]
impl SnapshotSource for MockSource {
    fn source_name(&self) -> &str {
        "mock"
    }

    async fn fetch_campaigns(&self) -> Result<Vec<CampaignSnapshot>, FetchError> {
        Ok(self.campaigns.lock().unwrap().clone())
    }

    async fn fetch_leads(&self, campaign_id: &str) -> Result<Vec<LeadSnapshot>, FetchError> {
        if self.failing.lock().unwrap().as_deref() == Some(campaign_id) {
            return Err(FetchError::Status {
                resource: format!("campaign:{campaign_id}/leads"),
                status: 503,
            });
        }
        Ok(self
            .leads
            .lock()
            .unwrap()
            .get(campaign_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Records every payload; optionally refuses delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<CompanyPush>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent_companies(&self) -> Vec<Vec<String>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.companies.clone())
            .collect()
    }
}

#[async_trait]
impl CompanyNotifier for RecordingNotifier {
    async fn notify(&self, push: &CompanyPush) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::HttpStatus(502));
        }
        self.sent.lock().unwrap().push(push.clone());
        Ok(())
    }
}
