//! Push deduplication against the persisted pushed set.
//!
//! A push reads the pushed set, decides the payload, delivers it and only
//! then records the delivered names and the change log entry. All of that
//! happens in one transaction holding the campaign's push lock, so two
//! concurrent pushes for the same campaign cannot both deliver the same
//! "new" company. A failed delivery rolls back and leaves the set as it was.

use std::collections::BTreeSet;

use leadwatch_core::change_log::push_details;
use leadwatch_core::notify::{CompanyNotifier, CompanyPush};
use leadwatch_core::push::{plan_push, PushKind, PushOutcome, PushRejection, PushStatus};
use leadwatch_db::models::change_log::CreateChangeLogEntry;
use leadwatch_db::repositories::{CampaignRepo, ChangeLogRepo, LockRepo, PushedCompanyRepo};
use sqlx::PgPool;

use crate::error::PushError;

#[derive(Clone)]
pub struct PushTracker {
    pool: PgPool,
}

impl PushTracker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The campaign's persisted pushed set.
    pub async fn pushed_set(&self, campaign_id: &str) -> Result<BTreeSet<String>, PushError> {
        PushedCompanyRepo::pushed_set(&self.pool, campaign_id)
            .await
            .map_err(PushError::persistence(campaign_id))
    }

    /// Push state for `current`, the campaign's live company set.
    pub async fn status(
        &self,
        campaign_id: &str,
        current: &BTreeSet<String>,
    ) -> Result<PushStatus, PushError> {
        let pushed = self.pushed_set(campaign_id).await?;
        Ok(PushStatus::compute(current, &pushed))
    }

    /// Deliver every current company, then union them into the pushed set.
    pub async fn push_all(
        &self,
        campaign_id: &str,
        current: &BTreeSet<String>,
        notifier: &dyn CompanyNotifier,
    ) -> Result<PushOutcome, PushError> {
        self.push(PushKind::All, campaign_id, current, notifier).await
    }

    /// Deliver only never-pushed companies, then union them into the
    /// pushed set.
    pub async fn push_new(
        &self,
        campaign_id: &str,
        current: &BTreeSet<String>,
        notifier: &dyn CompanyNotifier,
    ) -> Result<PushOutcome, PushError> {
        self.push(PushKind::New, campaign_id, current, notifier).await
    }

    async fn push(
        &self,
        kind: PushKind,
        campaign_id: &str,
        current: &BTreeSet<String>,
        notifier: &dyn CompanyNotifier,
    ) -> Result<PushOutcome, PushError> {
        if current.is_empty() {
            return Err(PushRejection::NoCompanyData {
                campaign_id: campaign_id.to_string(),
            }
            .into());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(PushError::persistence(campaign_id))?;
        LockRepo::lock_push(&mut *tx, campaign_id)
            .await
            .map_err(PushError::persistence(campaign_id))?;

        let pushed = PushedCompanyRepo::pushed_set(&mut *tx, campaign_id)
            .await
            .map_err(PushError::persistence(campaign_id))?;
        let payload = plan_push(kind, campaign_id, current, &pushed)?;

        notifier
            .notify(&CompanyPush::new(campaign_id, &payload))
            .await
            .map_err(|e| PushError::Delivery {
                campaign_id: campaign_id.to_string(),
                message: e.to_string(),
            })?;

        let newly_recorded = PushedCompanyRepo::mark_pushed(&mut *tx, campaign_id, &payload)
            .await
            .map_err(PushError::persistence(campaign_id))?;

        let campaign_name = CampaignRepo::find_by_id(&mut *tx, campaign_id)
            .await
            .map_err(PushError::persistence(campaign_id))?
            .map(|c| c.name);
        let mut entry = CreateChangeLogEntry::new(kind.change_type()).with_details(push_details(payload.len()));
        entry.campaign_id = Some(campaign_id.to_string());
        entry.campaign_name = campaign_name;
        ChangeLogRepo::append(&mut *tx, &entry)
            .await
            .map_err(PushError::persistence(campaign_id))?;

        tx.commit().await.map_err(PushError::persistence(campaign_id))?;

        tracing::info!(
            campaign_id = %campaign_id,
            kind = kind.change_type().as_str(),
            companies = payload.len(),
            newly_recorded,
            "Companies pushed"
        );
        Ok(PushOutcome::delivered(&payload))
    }
}
