//! Snapshot records and the normalizer that cleans them.
//!
//! A snapshot is a point-in-time read of campaigns and leads from the
//! external source. Records arrive with free-form text: blank strings,
//! padded company names, missing columns. The functions here fold all of
//! that into typed records whose optional fields are `None` when empty, and
//! compute the distinct company-name set that drives both the tracking
//! guard and push deduplication.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A campaign qualifies for tracking only with at least this many distinct
/// companies. Single-company campaigns are treated as noise.
pub const MIN_TRACKED_COMPANIES: usize = 2;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A campaign as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSnapshot {
    pub id: String,
    pub name: String,
    pub status: String,
}

/// A lead as reported by the source, scoped to one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSnapshot {
    pub id: String,
    pub campaign_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub state: Option<String>,
    pub state_system: Option<String>,
}

impl LeadSnapshot {
    /// Trim every optional text field and fold blanks to `None`.
    pub fn normalized(self) -> Self {
        Self {
            id: self.id.trim().to_string(),
            campaign_id: self.campaign_id.trim().to_string(),
            email: clean_text(self.email),
            first_name: clean_text(self.first_name),
            last_name: clean_text(self.last_name),
            company_name: clean_text(self.company_name),
            job_title: clean_text(self.job_title),
            linkedin_url: clean_text(self.linkedin_url),
            state: clean_text(self.state),
            state_system: clean_text(self.state_system),
        }
    }

    /// Whether any tracked field differs from `other`. Ids are not compared.
    pub fn fields_differ(&self, other: &LeadSnapshot) -> bool {
        self.email != other.email
            || self.first_name != other.first_name
            || self.last_name != other.last_name
            || self.company_name != other.company_name
            || self.job_title != other.job_title
            || self.linkedin_url != other.linkedin_url
            || self.state != other.state
            || self.state_system != other.state_system
    }

    /// Display name, `"First Last"` with missing parts dropped.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Trim a text value; empty or whitespace-only values become `None`.
pub fn clean_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Clean a raw company name. Returns `None` for missing or blank values.
pub fn normalize_company_name(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Distinct, cleaned company names from an iterator of raw values.
pub fn distinct_companies<'a, I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    names
        .into_iter()
        .filter_map(normalize_company_name)
        .collect()
}

/// Distinct, cleaned company names carried by a set of leads.
pub fn unique_companies<'a, I>(leads: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a LeadSnapshot>,
{
    distinct_companies(leads.into_iter().map(|l| l.company_name.as_deref()))
}

/// Whether a campaign with this company set should be tracked.
///
/// Requires at least one non-empty company name and strictly more than one
/// distinct company. Blank names never reach the set, so the size check
/// covers both conditions.
pub fn qualifies_for_tracking(companies: &BTreeSet<String>) -> bool {
    companies.len() >= MIN_TRACKED_COMPANIES
}

/// Normalize the raw leads of one campaign.
///
/// Every lead is cleaned and stamped with `campaign_id`; leads without an
/// id cannot be keyed and are dropped.
pub fn normalize_leads(campaign_id: &str, leads: Vec<LeadSnapshot>) -> Vec<LeadSnapshot> {
    leads
        .into_iter()
        .map(|lead| LeadSnapshot {
            campaign_id: campaign_id.to_string(),
            ..lead.normalized()
        })
        .filter(|lead| !lead.id.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tracked campaigns
// ---------------------------------------------------------------------------

/// A campaign that passed the tracking guard, with its cleaned leads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCampaign {
    pub campaign: CampaignSnapshot,
    pub leads: Vec<LeadSnapshot>,
    pub companies: BTreeSet<String>,
}

impl TrackedCampaign {
    pub fn unique_company_count(&self) -> usize {
        self.companies.len()
    }
}

/// Normalize a campaign's leads and apply the tracking guard.
///
/// Returns `None` when the campaign has fewer than
/// [`MIN_TRACKED_COMPANIES`] distinct companies.
pub fn select_tracked(
    campaign: CampaignSnapshot,
    leads: Vec<LeadSnapshot>,
) -> Option<TrackedCampaign> {
    let leads = normalize_leads(&campaign.id, leads);
    let companies = unique_companies(&leads);
    if !qualifies_for_tracking(&companies) {
        return None;
    }
    Some(TrackedCampaign {
        campaign,
        leads,
        companies,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: &str, company: Option<&str>) -> LeadSnapshot {
        LeadSnapshot {
            id: id.to_string(),
            campaign_id: "A".to_string(),
            company_name: company.map(str::to_string),
            ..Default::default()
        }
    }

    fn campaign(id: &str) -> CampaignSnapshot {
        CampaignSnapshot {
            id: id.to_string(),
            name: format!("Campaign {id}"),
            status: "running".to_string(),
        }
    }

    #[test]
    fn company_names_are_trimmed_and_blanks_dropped() {
        assert_eq!(normalize_company_name(Some("  Acme  ")), Some("Acme".into()));
        assert_eq!(normalize_company_name(Some("   ")), None);
        assert_eq!(normalize_company_name(Some("")), None);
        assert_eq!(normalize_company_name(None), None);
    }

    #[test]
    fn unique_companies_collapses_duplicates_after_trimming() {
        let leads = vec![
            lead("1", Some("Acme")),
            lead("2", Some(" Acme ")),
            lead("3", Some("Beta")),
            lead("4", None),
            lead("5", Some("  ")),
        ];
        let companies = unique_companies(&leads);
        assert_eq!(
            companies.into_iter().collect::<Vec<_>>(),
            vec!["Acme".to_string(), "Beta".to_string()]
        );
    }

    #[test]
    fn single_company_campaign_does_not_qualify() {
        let companies = unique_companies(&[lead("1", Some("Acme")), lead("2", Some("Acme"))]);
        assert!(!qualifies_for_tracking(&companies));
    }

    #[test]
    fn two_company_campaign_qualifies() {
        let companies = unique_companies(&[lead("1", Some("Acme")), lead("2", Some("Beta"))]);
        assert!(qualifies_for_tracking(&companies));
    }

    #[test]
    fn campaign_without_company_data_does_not_qualify() {
        let companies = unique_companies(&[lead("1", None), lead("2", Some(""))]);
        assert!(companies.is_empty());
        assert!(!qualifies_for_tracking(&companies));
    }

    #[test]
    fn normalized_folds_blank_fields() {
        let raw = LeadSnapshot {
            id: " L1 ".into(),
            campaign_id: "A".into(),
            email: Some("  ".into()),
            first_name: Some(" Ada ".into()),
            company_name: Some("Acme ".into()),
            ..Default::default()
        };
        let clean = raw.normalized();
        assert_eq!(clean.id, "L1");
        assert_eq!(clean.email, None);
        assert_eq!(clean.first_name.as_deref(), Some("Ada"));
        assert_eq!(clean.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn normalize_leads_stamps_campaign_and_drops_unkeyed() {
        let leads = vec![lead("1", Some("Acme")), lead("  ", Some("Beta"))];
        let cleaned = normalize_leads("B", leads);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].campaign_id, "B");
    }

    #[test]
    fn select_tracked_applies_guard() {
        assert!(select_tracked(campaign("A"), vec![lead("1", Some("Acme"))]).is_none());

        let tracked = select_tracked(
            campaign("A"),
            vec![lead("1", Some("Acme")), lead("2", Some("Beta"))],
        )
        .expect("two companies qualify");
        assert_eq!(tracked.unique_company_count(), 2);
        assert_eq!(tracked.leads.len(), 2);
    }

    #[test]
    fn display_name_skips_missing_parts() {
        let mut l = lead("1", None);
        l.first_name = Some("Ada".into());
        assert_eq!(l.display_name(), "Ada");
        l.last_name = Some("Lovelace".into());
        assert_eq!(l.display_name(), "Ada Lovelace");
    }

    #[test]
    fn fields_differ_ignores_ids() {
        let a = lead("1", Some("Acme"));
        let mut b = lead("2", Some("Acme"));
        assert!(!a.fields_differ(&b));
        b.state = Some("interested".into());
        assert!(a.fields_differ(&b));
    }
}
