//! Push deduplication.
//!
//! For every campaign the store keeps the set of company names already sent
//! to the downstream webhook. That set only grows. The functions here decide
//! what a push should deliver given the current company set and the pushed
//! set; persisting the union afterwards is up to the caller.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::change_log::ChangeType;

/// Which push operation is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushKind {
    /// Deliver every current company, pushed before or not.
    All,
    /// Deliver only companies never pushed for the campaign.
    New,
}

impl PushKind {
    /// The change log type recorded for a successful push of this kind.
    pub fn change_type(&self) -> ChangeType {
        match self {
            Self::All => ChangeType::PushAll,
            Self::New => ChangeType::PushNew,
        }
    }
}

/// A push guard condition. Returned as a value, never logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushRejection {
    #[error("No company names found for campaign {campaign_id}")]
    NoCompanyData { campaign_id: String },

    #[error("No new companies to push for campaign {campaign_id}")]
    NoNewCompanies { campaign_id: String },
}

impl PushRejection {
    pub fn campaign_id(&self) -> &str {
        match self {
            Self::NoCompanyData { campaign_id } | Self::NoNewCompanies { campaign_id } => {
                campaign_id
            }
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCompanyData { .. } => "NO_COMPANY_DATA",
            Self::NoNewCompanies { .. } => "NO_NEW_COMPANIES",
        }
    }
}

/// `current − pushed`.
pub fn new_companies(current: &BTreeSet<String>, pushed: &BTreeSet<String>) -> BTreeSet<String> {
    current.difference(pushed).cloned().collect()
}

/// Decide the payload of a push.
///
/// Both kinds reject an empty `current` set with
/// [`PushRejection::NoCompanyData`]. `All` returns `current` unchanged;
/// `New` returns the delta and rejects an empty one with
/// [`PushRejection::NoNewCompanies`].
pub fn plan_push(
    kind: PushKind,
    campaign_id: &str,
    current: &BTreeSet<String>,
    pushed: &BTreeSet<String>,
) -> Result<BTreeSet<String>, PushRejection> {
    if current.is_empty() {
        return Err(PushRejection::NoCompanyData {
            campaign_id: campaign_id.to_string(),
        });
    }
    match kind {
        PushKind::All => Ok(current.clone()),
        PushKind::New => {
            let delta = new_companies(current, pushed);
            if delta.is_empty() {
                return Err(PushRejection::NoNewCompanies {
                    campaign_id: campaign_id.to_string(),
                });
            }
            Ok(delta)
        }
    }
}

/// Push state of a campaign, as shown next to its push buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PushStatus {
    pub total_companies: usize,
    pub new_companies: usize,
    pub has_new_companies: bool,
    pub has_ever_been_pushed: bool,
    /// "Push new" is only offered once a campaign has been pushed at least
    /// once and has something new.
    pub show_push_new: bool,
}

impl PushStatus {
    pub fn compute(current: &BTreeSet<String>, pushed: &BTreeSet<String>) -> Self {
        let new_count = current.difference(pushed).count();
        let has_new_companies = new_count > 0;
        let has_ever_been_pushed = !pushed.is_empty();
        Self {
            total_companies: current.len(),
            new_companies: new_count,
            has_new_companies,
            has_ever_been_pushed,
            show_push_new: has_ever_been_pushed && has_new_companies,
        }
    }
}

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    pub success: bool,
    pub companies_pushed: usize,
    pub companies: Vec<String>,
}

impl PushOutcome {
    pub fn delivered(companies: &BTreeSet<String>) -> Self {
        Self {
            success: true,
            companies_pushed: companies.len(),
            companies: companies.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn push_all_rejects_empty_current_set() {
        let result = plan_push(PushKind::All, "A", &BTreeSet::new(), &BTreeSet::new());
        assert_matches!(result, Err(PushRejection::NoCompanyData { campaign_id }) if campaign_id == "A");
    }

    #[test]
    fn push_all_returns_full_set_even_if_already_pushed() {
        let current = set(&["Acme", "Beta"]);
        let payload = plan_push(PushKind::All, "A", &current, &current).unwrap();
        assert_eq!(payload, current);
    }

    #[test]
    fn push_new_returns_only_delta() {
        let payload = plan_push(
            PushKind::New,
            "A",
            &set(&["Acme", "Beta", "Gamma"]),
            &set(&["Acme", "Beta"]),
        )
        .unwrap();
        assert_eq!(payload, set(&["Gamma"]));
    }

    #[test]
    fn push_new_rejects_empty_delta() {
        let result = plan_push(PushKind::New, "A", &set(&["Acme"]), &set(&["Acme", "Beta"]));
        assert_matches!(result, Err(PushRejection::NoNewCompanies { .. }));
    }

    #[test]
    fn push_new_rejects_empty_current_before_delta() {
        let result = plan_push(PushKind::New, "A", &BTreeSet::new(), &set(&["Acme"]));
        assert_matches!(result, Err(PushRejection::NoCompanyData { .. }));
    }

    #[test]
    fn repeated_push_new_never_repeats_a_company() {
        let mut pushed = BTreeSet::new();
        let mut delivered = Vec::new();
        for current in [
            set(&["Acme", "Beta"]),
            set(&["Acme", "Beta"]),
            set(&["Acme", "Beta", "Gamma"]),
            set(&["Beta", "Gamma", "Delta"]),
        ] {
            if let Ok(payload) = plan_push(PushKind::New, "A", &current, &pushed) {
                delivered.extend(payload.iter().cloned());
                pushed.extend(payload);
            }
        }
        let unique: BTreeSet<_> = delivered.iter().cloned().collect();
        assert_eq!(unique.len(), delivered.len());
        assert_eq!(unique, set(&["Acme", "Beta", "Gamma", "Delta"]));
    }

    #[test]
    fn status_for_never_pushed_campaign() {
        let status = PushStatus::compute(&set(&["Acme", "Beta"]), &BTreeSet::new());
        assert_eq!(status.total_companies, 2);
        assert_eq!(status.new_companies, 2);
        assert!(status.has_new_companies);
        assert!(!status.has_ever_been_pushed);
        assert!(!status.show_push_new);
    }

    #[test]
    fn status_offers_push_new_only_after_first_push() {
        let status = PushStatus::compute(&set(&["Acme", "Beta", "Gamma"]), &set(&["Acme", "Beta"]));
        assert_eq!(status.new_companies, 1);
        assert!(status.show_push_new);

        let caught_up = PushStatus::compute(&set(&["Acme", "Beta"]), &set(&["Acme", "Beta", "Gamma"]));
        assert!(!caught_up.has_new_companies);
        assert!(!caught_up.show_push_new);
    }

    #[test]
    fn rejection_carries_code_and_campaign() {
        let rejection = PushRejection::NoNewCompanies {
            campaign_id: "cam_1".into(),
        };
        assert_eq!(rejection.code(), "NO_NEW_COMPANIES");
        assert_eq!(rejection.campaign_id(), "cam_1");
    }

    #[test]
    fn kind_maps_to_change_type() {
        assert_eq!(PushKind::All.change_type(), ChangeType::PushAll);
        assert_eq!(PushKind::New.change_type(), ChangeType::PushNew);
    }
}
