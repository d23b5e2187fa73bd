//! The downstream notification collaborator.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;

use crate::types::Timestamp;

/// Payload delivered for one push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyPush {
    pub campaign_id: String,
    pub companies: Vec<String>,
    pub timestamp: Timestamp,
    pub count: usize,
}

impl CompanyPush {
    pub fn new(campaign_id: &str, companies: &BTreeSet<String>) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            companies: companies.iter().cloned().collect(),
            timestamp: chrono::Utc::now(),
            count: companies.len(),
        }
    }
}

/// A delivery that did not reach the receiver.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(String),

    #[error("Notification receiver returned HTTP {0}")]
    HttpStatus(u16),
}

/// Sends company names downstream. Implementations make a single attempt.
#[async_trait]
pub trait CompanyNotifier: Send + Sync {
    async fn notify(&self, push: &CompanyPush) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_counts_companies() {
        let companies: BTreeSet<String> = ["Beta", "Acme"].iter().map(|s| s.to_string()).collect();
        let push = CompanyPush::new("A", &companies);
        assert_eq!(push.count, 2);
        assert_eq!(push.companies, vec!["Acme".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn error_display_includes_status() {
        assert_eq!(
            NotifyError::HttpStatus(502).to_string(),
            "Notification receiver returned HTTP 502"
        );
    }
}
