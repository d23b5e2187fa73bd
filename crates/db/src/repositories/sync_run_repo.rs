//! Repository for the `sync_history` table.

use leadwatch_core::pagination::{clamp_limit, DEFAULT_SYNC_HISTORY_LIMIT, MAX_SYNC_HISTORY_LIMIT};
use leadwatch_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::sync_run::{sync_types, CompleteSyncRun, CreateSyncRun, SyncRun};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, sync_type, campaigns_processed, leads_processed, \
    campaigns_added, campaigns_removed, campaigns_updated, \
    leads_added, leads_removed, leads_updated, \
    sync_timestamp, duration_seconds";

/// Provides two-phase write and query operations for sync runs.
pub struct SyncRunRepo;

impl SyncRunRepo {
    /// Phase one: record the campaign counts of a pass.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateSyncRun,
    ) -> Result<SyncRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO sync_history
                (sync_type, campaigns_processed, campaigns_added, campaigns_removed, campaigns_updated)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncRun>(&query)
            .bind(sync_types::INCREMENTAL)
            .bind(input.campaigns_processed)
            .bind(input.campaigns_added)
            .bind(input.campaigns_removed)
            .bind(input.campaigns_updated)
            .fetch_one(executor)
            .await
    }

    /// Phase two: fill in lead counts and duration.
    ///
    /// A run is completed at most once; returns `None` if `id` does not
    /// exist or was already completed.
    pub async fn complete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &CompleteSyncRun,
    ) -> Result<Option<SyncRun>, sqlx::Error> {
        let query = format!(
            "UPDATE sync_history SET
                leads_processed = $2,
                leads_added = $3,
                leads_removed = $4,
                leads_updated = $5,
                duration_seconds = $6
             WHERE id = $1 AND duration_seconds IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncRun>(&query)
            .bind(id)
            .bind(input.leads_processed)
            .bind(input.leads_added)
            .bind(input.leads_removed)
            .bind(input.leads_updated)
            .bind(input.duration_seconds)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<SyncRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sync_history WHERE id = $1");
        sqlx::query_as::<_, SyncRun>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The most recently started run, complete or not.
    pub async fn find_latest<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<SyncRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sync_history ORDER BY sync_timestamp DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, SyncRun>(&query)
            .fetch_optional(executor)
            .await
    }

    /// Recent runs, newest first. `limit` defaults to 20, max 100.
    pub async fn list_recent<'e>(
        executor: impl PgExecutor<'e>,
        limit: Option<i64>,
    ) -> Result<Vec<SyncRun>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_SYNC_HISTORY_LIMIT, MAX_SYNC_HISTORY_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM sync_history ORDER BY sync_timestamp DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, SyncRun>(&query)
            .bind(limit)
            .fetch_all(executor)
            .await
    }
}
