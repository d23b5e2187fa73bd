//! Campaign and lead reconciliation against the store.
//!
//! A full pass runs in two transactions, both holding the sync advisory
//! lock:
//!
//! 1. Campaign diff, its change log entries and the new sync run row.
//! 2. Every tracked campaign's lead diff, then the sync run completion.
//!
//! Each campaign's lead diff runs in its own savepoint so one bad campaign
//! is rolled back and reported without losing the others. Every single
//! campaign or lead write is paired with its change log entry in a nested
//! savepoint, so a record that fails is skipped and reported as a
//! [`RecordFailure`]. Added leads are tried as one batch first and only
//! fall back to per-record savepoints if the batch fails.

use std::collections::BTreeMap;
use std::time::Instant;

use leadwatch_core::change_log::ChangeType;
use leadwatch_core::reconcile::{describe_lead, plan_campaigns, plan_leads, LeadSummary};
use leadwatch_core::snapshot::{normalize_leads, CampaignSnapshot, LeadSnapshot};
use leadwatch_core::source::SnapshotSource;
use leadwatch_core::types::DbId;
use leadwatch_db::models::change_log::CreateChangeLogEntry;
use leadwatch_db::models::sync_run::{CompleteSyncRun, CreateSyncRun};
use leadwatch_db::repositories::{CampaignRepo, ChangeLogRepo, LeadRepo, LockRepo, SyncRunRepo};
use serde::Serialize;
use sqlx::{Connection, PgConnection, PgPool, Postgres, Transaction};

use crate::error::{RecordFailure, SyncError};
use crate::fetch::fetch_tracked;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Campaign-level outcome of one reconciliation. Counts cover only the
/// campaigns that were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignChanges {
    pub campaigns_added: usize,
    pub campaigns_removed: usize,
    pub campaigns_updated: usize,
    /// Campaigns that could not be written. A pass moves these into
    /// [`PassReport::failures`].
    #[serde(skip)]
    pub failures: Vec<RecordFailure>,
}

/// Lead-level outcome for one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeadChanges {
    pub leads_added: usize,
    pub leads_removed: usize,
    pub leads_updated: usize,
    /// Informational only.
    pub company_count_change: i64,
    pub added_leads: Vec<LeadSummary>,
    pub removed_leads: Vec<LeadSummary>,
    /// Leads that could not be added, removed or updated.
    pub failures: Vec<RecordFailure>,
}

/// Lead-level totals across a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassLeadChanges {
    pub leads_added: usize,
    pub leads_removed: usize,
    pub leads_updated: usize,
    /// Keyed by campaign id; only campaigns whose count moved.
    pub company_count_changes: BTreeMap<String, i64>,
    pub all_added_leads: Vec<LeadSummary>,
    pub all_removed_leads: Vec<LeadSummary>,
}

impl PassLeadChanges {
    fn absorb(&mut self, campaign_id: &str, changes: LeadChanges) {
        self.leads_added += changes.leads_added;
        self.leads_removed += changes.leads_removed;
        self.leads_updated += changes.leads_updated;
        if changes.company_count_change != 0 {
            self.company_count_changes
                .insert(campaign_id.to_string(), changes.company_count_change);
        }
        self.all_added_leads.extend(changes.added_leads);
        self.all_removed_leads.extend(changes.removed_leads);
    }
}

/// Outcome of a full reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub sync_run_id: DbId,
    pub campaigns_processed: usize,
    pub leads_processed: usize,
    pub duration_seconds: f64,
    #[serde(flatten)]
    pub campaign_changes: CampaignChanges,
    pub lead_changes: PassLeadChanges,
    /// Campaigns and leads that were skipped because they failed to write.
    pub failures: Vec<RecordFailure>,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Applies snapshots to the store.
#[derive(Clone)]
pub struct Reconciler {
    pool: PgPool,
}

impl Reconciler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reconcile the active campaign set against `snapshot` in one
    /// transaction. Does not touch leads or sync runs.
    pub async fn reconcile_campaigns(
        &self,
        snapshot: &[CampaignSnapshot],
    ) -> Result<CampaignChanges, SyncError> {
        let mut tx = self.pool.begin().await.map_err(SyncError::persistence("campaigns"))?;
        LockRepo::lock_sync(&mut *tx)
            .await
            .map_err(SyncError::persistence("sync lock"))?;
        let changes = apply_campaigns(&mut tx, snapshot).await?;
        tx.commit().await.map_err(SyncError::persistence("campaigns"))?;
        Ok(changes)
    }

    /// Reconcile one campaign's active leads against `snapshot` in one
    /// transaction. The snapshot is normalized first.
    pub async fn reconcile_leads(
        &self,
        campaign_id: &str,
        campaign_name: &str,
        snapshot: Vec<LeadSnapshot>,
    ) -> Result<LeadChanges, SyncError> {
        let key = format!("campaign:{campaign_id}");
        let leads = normalize_leads(campaign_id, snapshot);

        let mut tx = self.pool.begin().await.map_err(SyncError::persistence(&key))?;
        LockRepo::lock_sync(&mut *tx)
            .await
            .map_err(SyncError::persistence("sync lock"))?;
        let changes = apply_leads(&mut tx, campaign_id, campaign_name, &leads).await?;
        tx.commit().await.map_err(SyncError::persistence(&key))?;
        Ok(changes)
    }

    /// Fetch a complete snapshot from `source` and run a two-phase pass.
    ///
    /// A fetch failure returns [`SyncError::Fetch`] with nothing written.
    /// If the process stops after phase one, the sync run row keeps its
    /// campaign counts and a NULL duration.
    pub async fn run_pass(&self, source: &dyn SnapshotSource) -> Result<PassReport, SyncError> {
        let started = Instant::now();
        let tracked = fetch_tracked(source).await?;
        let campaigns: Vec<CampaignSnapshot> =
            tracked.iter().map(|t| t.campaign.clone()).collect();

        // Phase one: campaigns + sync run row.
        let mut tx = self.pool.begin().await.map_err(SyncError::persistence("campaigns"))?;
        LockRepo::lock_sync(&mut *tx)
            .await
            .map_err(SyncError::persistence("sync lock"))?;
        let mut campaign_changes = apply_campaigns(&mut tx, &campaigns).await?;
        let run = SyncRunRepo::create(
            &mut *tx,
            &CreateSyncRun {
                campaigns_processed: count(campaigns.len()),
                campaigns_added: count(campaign_changes.campaigns_added),
                campaigns_removed: count(campaign_changes.campaigns_removed),
                campaigns_updated: count(campaign_changes.campaigns_updated),
            },
        )
        .await
        .map_err(SyncError::persistence("sync_history"))?;
        tx.commit().await.map_err(SyncError::persistence("campaigns"))?;

        // Phase two: leads per campaign + sync run completion.
        let mut tx = self.pool.begin().await.map_err(SyncError::persistence("leads"))?;
        LockRepo::lock_sync(&mut *tx)
            .await
            .map_err(SyncError::persistence("sync lock"))?;

        let mut lead_changes = PassLeadChanges::default();
        let mut failures = std::mem::take(&mut campaign_changes.failures);
        let mut leads_processed = 0;

        for t in &tracked {
            let campaign_id = &t.campaign.id;
            leads_processed += t.leads.len();

            let key = format!("campaign:{campaign_id}");
            let mut savepoint = tx.begin().await.map_err(SyncError::persistence(&key))?;
            let result = apply_leads(&mut savepoint, campaign_id, &t.campaign.name, &t.leads).await;
            match settle(savepoint, result, &key).await? {
                Ok(mut changes) => {
                    failures.append(&mut changes.failures);
                    lead_changes.absorb(campaign_id, changes);
                }
                Err(e) => {
                    tracing::warn!(
                        campaign_id = %campaign_id,
                        error = %e,
                        "Lead reconciliation failed, campaign skipped"
                    );
                    failures.push(RecordFailure::campaign(campaign_id, &e));
                }
            }
        }

        let duration_seconds = started.elapsed().as_secs_f64();
        SyncRunRepo::complete(
            &mut *tx,
            run.id,
            &CompleteSyncRun {
                leads_processed: count(leads_processed),
                leads_added: count(lead_changes.leads_added),
                leads_removed: count(lead_changes.leads_removed),
                leads_updated: count(lead_changes.leads_updated),
                duration_seconds,
            },
        )
        .await
        .and_then(|completed| completed.ok_or(sqlx::Error::RowNotFound))
        .map_err(SyncError::persistence(format!("sync_history:{}", run.id)))?;
        tx.commit().await.map_err(SyncError::persistence("leads"))?;

        tracing::info!(
            sync_run_id = run.id,
            campaigns = campaigns.len(),
            campaigns_added = campaign_changes.campaigns_added,
            campaigns_removed = campaign_changes.campaigns_removed,
            leads_added = lead_changes.leads_added,
            leads_removed = lead_changes.leads_removed,
            failures = failures.len(),
            duration_seconds,
            "Reconciliation pass completed"
        );

        Ok(PassReport {
            sync_run_id: run.id,
            campaigns_processed: campaigns.len(),
            leads_processed,
            duration_seconds,
            campaign_changes,
            lead_changes,
            failures,
        })
    }
}

/// Counts are stored as INTEGER.
fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Commit `savepoint` if `result` is `Ok`, roll it back otherwise, and hand
/// `result` back. Only a failed commit or rollback is an error here.
async fn settle<T, E>(
    savepoint: Transaction<'_, Postgres>,
    result: Result<T, E>,
    key: &str,
) -> Result<Result<T, E>, SyncError> {
    match result {
        Ok(value) => {
            savepoint.commit().await.map_err(SyncError::persistence(key))?;
            Ok(Ok(value))
        }
        Err(e) => {
            savepoint.rollback().await.map_err(SyncError::persistence(key))?;
            Ok(Err(e))
        }
    }
}

// ---------------------------------------------------------------------------
// Campaign diff
// ---------------------------------------------------------------------------

async fn apply_campaigns(
    conn: &mut PgConnection,
    snapshot: &[CampaignSnapshot],
) -> Result<CampaignChanges, SyncError> {
    let stored: Vec<CampaignSnapshot> = CampaignRepo::list_active(&mut *conn)
        .await
        .map_err(SyncError::persistence("campaigns"))?
        .iter()
        .map(|c| c.to_snapshot())
        .collect();
    let plan = plan_campaigns(&stored, snapshot);
    let mut changes = CampaignChanges::default();

    for campaign in &plan.added {
        let key = format!("campaign:{}", campaign.id);
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&key))?;
        let result = async {
            CampaignRepo::upsert_active(&mut *savepoint, campaign).await?;
            ChangeLogRepo::append(
                &mut *savepoint,
                &CreateChangeLogEntry::for_campaign(ChangeType::CampaignAdded, campaign),
            )
            .await
        }
        .await;
        match settle(savepoint, result, &key).await? {
            Ok(_) => {
                changes.campaigns_added += 1;
                tracing::info!(campaign_id = %campaign.id, name = %campaign.name, "Campaign added");
            }
            Err(e) => {
                tracing::warn!(campaign_id = %campaign.id, error = %e, "Campaign insert failed");
                changes.failures.push(RecordFailure::campaign(&campaign.id, &e));
            }
        }
    }

    for campaign in &plan.removed {
        let key = format!("campaign:{}", campaign.id);
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&key))?;
        let result = async {
            CampaignRepo::deactivate(&mut *savepoint, &campaign.id).await?;
            ChangeLogRepo::append(
                &mut *savepoint,
                &CreateChangeLogEntry::for_campaign(ChangeType::CampaignRemoved, campaign),
            )
            .await
        }
        .await;
        match settle(savepoint, result, &key).await? {
            Ok(_) => {
                changes.campaigns_removed += 1;
                tracing::info!(campaign_id = %campaign.id, name = %campaign.name, "Campaign removed");
            }
            Err(e) => {
                tracing::warn!(campaign_id = %campaign.id, error = %e, "Campaign removal failed");
                changes.failures.push(RecordFailure::campaign(&campaign.id, &e));
            }
        }
    }

    for update in &plan.updated {
        let campaign = &update.after;
        let key = format!("campaign:{}", campaign.id);
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&key))?;
        let result = async {
            CampaignRepo::update_fields(&mut *savepoint, campaign).await?;
            ChangeLogRepo::append(
                &mut *savepoint,
                &CreateChangeLogEntry::for_campaign(ChangeType::CampaignUpdated, campaign)
                    .with_values(update.old_value(), update.new_value()),
            )
            .await
        }
        .await;
        match settle(savepoint, result, &key).await? {
            Ok(_) => {
                changes.campaigns_updated += 1;
                tracing::info!(campaign_id = %campaign.id, name = %campaign.name, "Campaign updated");
            }
            Err(e) => {
                tracing::warn!(campaign_id = %campaign.id, error = %e, "Campaign update failed");
                changes.failures.push(RecordFailure::campaign(&campaign.id, &e));
            }
        }
    }

    Ok(changes)
}

// ---------------------------------------------------------------------------
// Lead diff
// ---------------------------------------------------------------------------

/// `leads` must already be normalized for `campaign_id`.
async fn apply_leads(
    conn: &mut PgConnection,
    campaign_id: &str,
    campaign_name: &str,
    leads: &[LeadSnapshot],
) -> Result<LeadChanges, SyncError> {
    let key = format!("campaign:{campaign_id}");
    let stored: Vec<LeadSnapshot> = LeadRepo::list_active_for_campaign(&mut *conn, campaign_id)
        .await
        .map_err(SyncError::persistence(&key))?
        .iter()
        .map(|l| l.to_snapshot())
        .collect();
    let plan = plan_leads(&stored, leads);
    let entry = |change_type| CreateChangeLogEntry::campaign(change_type, campaign_id, campaign_name);

    let (inserted, mut failures) = insert_added(conn, campaign_id, campaign_name, &plan.added).await?;

    let mut removed = Vec::with_capacity(plan.removed.len());
    for lead in &plan.removed {
        let lead_key = format!("lead:{campaign_id}/{}", lead.id);
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&lead_key))?;
        let result = async {
            LeadRepo::deactivate(&mut *savepoint, campaign_id, &lead.id).await?;
            ChangeLogRepo::append(
                &mut *savepoint,
                &entry(ChangeType::LeadRemoved)
                    .with_lead(lead)
                    .with_details(describe_lead("removed", lead)),
            )
            .await
        }
        .await;
        match settle(savepoint, result, &lead_key).await? {
            Ok(_) => removed.push(lead),
            Err(e) => {
                tracing::warn!(campaign_id = %campaign_id, lead_id = %lead.id, error = %e, "Lead removal failed");
                failures.push(RecordFailure::lead(campaign_id, &lead.id, &e));
            }
        }
    }

    let mut updated = 0;
    for update in &plan.updated {
        let lead = &update.after;
        let lead_key = format!("lead:{campaign_id}/{}", lead.id);
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&lead_key))?;
        let result = async {
            LeadRepo::update_fields(&mut *savepoint, lead).await?;
            ChangeLogRepo::append(
                &mut *savepoint,
                &entry(ChangeType::LeadUpdated)
                    .with_lead(lead)
                    .with_values(update.old_value(), update.new_value()),
            )
            .await
        }
        .await;
        match settle(savepoint, result, &lead_key).await? {
            Ok(_) => updated += 1,
            Err(e) => {
                tracing::warn!(campaign_id = %campaign_id, lead_id = %lead.id, error = %e, "Lead update failed");
                failures.push(RecordFailure::lead(campaign_id, &lead.id, &e));
            }
        }
    }

    let company_count_change = plan.company_count_change();
    if company_count_change != 0 {
        ChangeLogRepo::append(
            &mut *conn,
            &entry(ChangeType::CompanyCountChanged)
                .with_values(plan.old_company_count, plan.new_company_count),
        )
        .await
        .map_err(SyncError::persistence(&key))?;
    }

    let changes = LeadChanges {
        leads_added: inserted.len(),
        leads_removed: removed.len(),
        leads_updated: updated,
        company_count_change,
        added_leads: inserted.iter().map(|l| LeadSummary::from(*l)).collect(),
        removed_leads: removed.iter().map(|l| LeadSummary::from(*l)).collect(),
        failures,
    };
    if changes.leads_added > 0 || changes.leads_removed > 0 || changes.leads_updated > 0 {
        tracing::info!(
            campaign_id = %campaign_id,
            campaign_name = %campaign_name,
            leads_added = changes.leads_added,
            leads_removed = changes.leads_removed,
            leads_updated = changes.leads_updated,
            company_count_change,
            "Lead changes applied"
        );
    }
    Ok(changes)
}

/// Insert added leads and their `lead_added` entries.
///
/// Tries one batch first; on failure falls back to one savepoint per lead.
/// Returns the leads that were written and the ones that were not.
async fn insert_added<'a>(
    conn: &mut PgConnection,
    campaign_id: &str,
    campaign_name: &str,
    added: &'a [LeadSnapshot],
) -> Result<(Vec<&'a LeadSnapshot>, Vec<RecordFailure>), SyncError> {
    if added.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let key = format!("campaign:{campaign_id}");
    let entries: Vec<CreateChangeLogEntry> = added
        .iter()
        .map(|lead| {
            CreateChangeLogEntry::campaign(ChangeType::LeadAdded, campaign_id, campaign_name)
                .with_lead(lead)
                .with_details(describe_lead("added", lead))
        })
        .collect();

    let mut batch = conn.begin().await.map_err(SyncError::persistence(&key))?;
    let result = async {
        LeadRepo::upsert_batch(&mut batch, added).await?;
        ChangeLogRepo::append_batch(&mut batch, &entries).await
    }
    .await;
    match settle(batch, result, &key).await? {
        Ok(_) => return Ok((added.iter().collect(), Vec::new())),
        Err(e) => tracing::warn!(
            campaign_id = %campaign_id,
            count = added.len(),
            error = %e,
            "Batch lead insert failed, retrying per record"
        ),
    }

    let mut inserted = Vec::with_capacity(added.len());
    let mut failures = Vec::new();
    for (lead, entry) in added.iter().zip(&entries) {
        let mut savepoint = conn.begin().await.map_err(SyncError::persistence(&key))?;
        let result = async {
            LeadRepo::upsert(&mut *savepoint, lead).await?;
            ChangeLogRepo::append(&mut *savepoint, entry).await
        }
        .await;
        match settle(savepoint, result, &key).await? {
            Ok(_) => inserted.push(lead),
            Err(e) => {
                tracing::warn!(campaign_id = %campaign_id, lead_id = %lead.id, error = %e, "Lead insert failed");
                failures.push(RecordFailure::lead(campaign_id, &lead.id, &e));
            }
        }
    }
    Ok((inserted, failures))
}
