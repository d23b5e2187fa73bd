//! Set algebra for reconciling a snapshot against persisted state.
//!
//! The planners in this module are pure: given the currently active stored
//! records and an incoming snapshot, they decide which records are added,
//! removed (soft-deleted) or updated. Applying a plan to the store, and
//! writing the paired change log entries, is the sync engine's job.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::snapshot::{distinct_companies, CampaignSnapshot, LeadSnapshot};

// ---------------------------------------------------------------------------
// Id partition
// ---------------------------------------------------------------------------

/// Split of two id sets into `added = new − old`, `removed = old − new` and
/// `retained = old ∩ new`. The three sets are pairwise disjoint and their
/// union is `old ∪ new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPartition<K: Ord> {
    pub added: BTreeSet<K>,
    pub removed: BTreeSet<K>,
    pub retained: BTreeSet<K>,
}

/// Partition `old` and `new` id sets.
pub fn partition_ids<K: Ord + Clone>(old: &BTreeSet<K>, new: &BTreeSet<K>) -> IdPartition<K> {
    IdPartition {
        added: new.difference(old).cloned().collect(),
        removed: old.difference(new).cloned().collect(),
        retained: old.intersection(new).cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// A retained campaign whose name or status changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignUpdate {
    pub before: CampaignSnapshot,
    pub after: CampaignSnapshot,
}

impl CampaignUpdate {
    pub fn old_value(&self) -> serde_json::Value {
        campaign_fields_json(&self.before)
    }

    pub fn new_value(&self) -> serde_json::Value {
        campaign_fields_json(&self.after)
    }
}

/// What a campaign snapshot changes relative to the stored active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignPlan {
    /// Campaigns to insert, in snapshot values.
    pub added: Vec<CampaignSnapshot>,
    /// Campaigns to soft-delete, in stored values.
    pub removed: Vec<CampaignSnapshot>,
    pub updated: Vec<CampaignUpdate>,
}

/// JSON form of the diffed campaign fields, stored as old/new change values.
pub fn campaign_fields_json(campaign: &CampaignSnapshot) -> serde_json::Value {
    serde_json::json!({
        "name": campaign.name,
        "status": campaign.status,
    })
}

/// Plan the campaign-level reconciliation.
///
/// `stored` holds the active campaigns currently persisted. Duplicate ids in
/// `snapshot` collapse to their last occurrence.
pub fn plan_campaigns(stored: &[CampaignSnapshot], snapshot: &[CampaignSnapshot]) -> CampaignPlan {
    let old: BTreeMap<&str, &CampaignSnapshot> =
        stored.iter().map(|c| (c.id.as_str(), c)).collect();
    let new: BTreeMap<&str, &CampaignSnapshot> =
        snapshot.iter().map(|c| (c.id.as_str(), c)).collect();

    let partition = partition_ids(
        &old.keys().copied().collect(),
        &new.keys().copied().collect(),
    );

    let added = partition
        .added
        .iter()
        .map(|id| new[id].clone())
        .collect();
    let removed = partition
        .removed
        .iter()
        .map(|id| old[id].clone())
        .collect();
    let updated = partition
        .retained
        .iter()
        .filter_map(|id| {
            let (before, after) = (old[id], new[id]);
            (before.name != after.name || before.status != after.status).then(|| CampaignUpdate {
                before: before.clone(),
                after: after.clone(),
            })
        })
        .collect();

    CampaignPlan {
        added,
        removed,
        updated,
    }
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// A retained lead whose tracked fields changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadUpdate {
    pub before: LeadSnapshot,
    pub after: LeadSnapshot,
}

impl LeadUpdate {
    pub fn old_value(&self) -> serde_json::Value {
        lead_fields_json(&self.before)
    }

    pub fn new_value(&self) -> serde_json::Value {
        lead_fields_json(&self.after)
    }
}

/// What a lead snapshot changes for one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPlan {
    /// Leads to insert, in snapshot values.
    pub added: Vec<LeadSnapshot>,
    /// Leads to soft-delete, in previously stored values.
    pub removed: Vec<LeadSnapshot>,
    pub updated: Vec<LeadUpdate>,
    /// Distinct companies among the stored active leads.
    pub old_company_count: usize,
    /// Distinct companies in the snapshot.
    pub new_company_count: usize,
}

impl LeadPlan {
    /// Informational only; never used to gate any mutation.
    pub fn company_count_change(&self) -> i64 {
        self.new_company_count as i64 - self.old_company_count as i64
    }
}

/// JSON form of the diffed lead fields.
pub fn lead_fields_json(lead: &LeadSnapshot) -> serde_json::Value {
    serde_json::json!({
        "email": lead.email,
        "firstName": lead.first_name,
        "lastName": lead.last_name,
        "companyName": lead.company_name,
        "jobTitle": lead.job_title,
        "linkedinUrl": lead.linkedin_url,
        "state": lead.state,
        "stateSystem": lead.state_system,
    })
}

/// Plan the lead-level reconciliation for one campaign.
///
/// `stored` holds the campaign's active leads; `snapshot` the normalized
/// leads just fetched. Duplicate ids in `snapshot` collapse to their last
/// occurrence.
pub fn plan_leads(stored: &[LeadSnapshot], snapshot: &[LeadSnapshot]) -> LeadPlan {
    let old: BTreeMap<&str, &LeadSnapshot> = stored.iter().map(|l| (l.id.as_str(), l)).collect();
    let new: BTreeMap<&str, &LeadSnapshot> =
        snapshot.iter().map(|l| (l.id.as_str(), l)).collect();

    let partition = partition_ids(
        &old.keys().copied().collect(),
        &new.keys().copied().collect(),
    );

    let added = partition
        .added
        .iter()
        .map(|id| new[id].clone())
        .collect();
    let removed = partition
        .removed
        .iter()
        .map(|id| old[id].clone())
        .collect();
    let updated = partition
        .retained
        .iter()
        .filter_map(|id| {
            let (before, after) = (old[id], new[id]);
            before.fields_differ(after).then(|| LeadUpdate {
                before: before.clone(),
                after: after.clone(),
            })
        })
        .collect();

    let old_company_count =
        distinct_companies(old.values().map(|l| l.company_name.as_deref())).len();
    let new_company_count =
        distinct_companies(new.values().map(|l| l.company_name.as_deref())).len();

    LeadPlan {
        added,
        removed,
        updated,
        old_company_count,
        new_company_count,
    }
}

// ---------------------------------------------------------------------------
// Lead summaries
// ---------------------------------------------------------------------------

/// Compact description of an added or removed lead, returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSummary {
    pub email: Option<String>,
    pub company: Option<String>,
    pub name: String,
}

impl From<&LeadSnapshot> for LeadSummary {
    fn from(lead: &LeadSnapshot) -> Self {
        Self {
            email: lead.email.clone(),
            company: lead.company_name.clone(),
            name: lead.display_name(),
        }
    }
}

/// Human-readable line for the change log, e.g.
/// `Lead added: Ada Lovelace (ada@acme.io) from Acme`.
pub fn describe_lead(verb: &str, lead: &LeadSnapshot) -> String {
    format!(
        "Lead {verb}: {} {} ({}) from {}",
        lead.first_name.as_deref().unwrap_or(""),
        lead.last_name.as_deref().unwrap_or(""),
        lead.email.as_deref().unwrap_or(""),
        lead.company_name.as_deref().unwrap_or("N/A"),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
