//! The snapshot source collaborator.
//!
//! Reconciliation never talks to the outside world itself. A caller fetches
//! a complete snapshot through a [`SnapshotSource`] first and only then runs
//! the engine, so a failed fetch can never leave a partial diff behind.

use async_trait::async_trait;

use crate::snapshot::{CampaignSnapshot, LeadSnapshot};

/// A failed snapshot fetch. Tagged with the resource it concerns (the
/// campaign list or one campaign's leads).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (network, DNS, timeout).
    #[error("Request for {resource} failed: {message}")]
    Transport { resource: String, message: String },

    /// The source answered with a non-2xx status.
    #[error("Source returned HTTP {status} for {resource}")]
    Status { resource: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("Unexpected payload for {resource}: {message}")]
    Decode { resource: String, message: String },

    /// Paging stopped at the page cap while the source still had more.
    #[error("{resource} still had full pages after {pages} pages")]
    Truncated { resource: String, pages: u32 },
}

impl FetchError {
    /// The resource (e.g. `campaigns` or `campaign:{id}/leads`) that failed.
    pub fn resource(&self) -> &str {
        match self {
            Self::Transport { resource, .. }
            | Self::Status { resource, .. }
            | Self::Decode { resource, .. }
            | Self::Truncated { resource, .. } => resource,
        }
    }
}

/// Read access to the external campaign/lead system.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short name used in logs and sync run records.
    fn source_name(&self) -> &str;

    /// Campaigns currently eligible for tracking at the source.
    async fn fetch_campaigns(&self) -> Result<Vec<CampaignSnapshot>, FetchError>;

    /// All leads of one campaign, unnormalized.
    async fn fetch_leads(&self, campaign_id: &str) -> Result<Vec<LeadSnapshot>, FetchError>;
}
