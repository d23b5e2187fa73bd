//! Transaction-scoped advisory locks.
//!
//! Locks are released automatically when the surrounding transaction
//! commits or rolls back, so they must be taken on a transaction
//! connection. Taking them on a pooled autocommit connection is a no-op.

use sqlx::PgExecutor;

/// Lock namespace for reconciliation passes.
const SYNC_NAMESPACE: i32 = 1;

/// Lock namespace for per-campaign pushes.
const PUSH_NAMESPACE: i32 = 2;

pub struct LockRepo;

impl LockRepo {
    /// Serialize reconciliation passes across processes.
    pub async fn lock_sync<'e>(executor: impl PgExecutor<'e>) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, 0)")
            .bind(SYNC_NAMESPACE)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Serialize pushes for one campaign.
    pub async fn lock_push<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(PUSH_NAMESPACE)
            .bind(campaign_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
