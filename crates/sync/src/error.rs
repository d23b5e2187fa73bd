use leadwatch_core::push::PushRejection;
use leadwatch_core::source::FetchError;
use serde::Serialize;

/// Failure of a reconciliation call.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The snapshot could not be fetched; nothing was written.
    #[error("Snapshot fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A storage operation failed. `key` names what was being written.
    #[error("Failed to persist {key}: {source}")]
    Persistence {
        key: String,
        #[source]
        source: sqlx::Error,
    },
}

impl SyncError {
    /// `map_err` adapter tagging a database error with its key.
    pub(crate) fn persistence(key: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let key = key.into();
        move |source| Self::Persistence { key, source }
    }
}

/// Failure of a push. Guard rejections are ordinary values, not faults.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error(transparent)]
    Rejected(#[from] PushRejection),

    /// The webhook did not accept the payload. The pushed set is unchanged.
    #[error("Delivery failed for campaign {campaign_id}: {message}")]
    Delivery { campaign_id: String, message: String },

    #[error("Failed to persist push for campaign {campaign_id}: {source}")]
    Persistence {
        campaign_id: String,
        #[source]
        source: sqlx::Error,
    },
}

impl PushError {
    pub(crate) fn persistence(campaign_id: &str) -> impl FnOnce(sqlx::Error) -> Self {
        let campaign_id = campaign_id.to_string();
        move |source| Self::Persistence {
            campaign_id,
            source,
        }
    }
}

/// A single record that could not be written. The rest of the pass
/// carried on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// `campaign:{id}` or `lead:{campaign_id}/{lead_id}`.
    pub key: String,
    pub error: String,
}

impl RecordFailure {
    pub fn campaign(campaign_id: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            key: format!("campaign:{campaign_id}"),
            error: error.to_string(),
        }
    }

    pub fn lead(campaign_id: &str, lead_id: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            key: format!("lead:{campaign_id}/{lead_id}"),
            error: error.to_string(),
        }
    }
}
