//! Repository for the `campaigns` table.

use leadwatch_core::snapshot::CampaignSnapshot;
use sqlx::PgExecutor;

use crate::models::campaign::Campaign;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, status, created_at, last_updated, is_active";

/// Provides CRUD operations for campaigns. Rows are never deleted.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a campaign, or reactivate and overwrite a soft-deleted one
    /// with the same id.
    pub async fn upsert_active<'e>(
        executor: impl PgExecutor<'e>,
        campaign: &CampaignSnapshot,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (id, name, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                status = EXCLUDED.status,
                is_active = true,
                last_updated = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&campaign.id)
            .bind(&campaign.name)
            .bind(&campaign.status)
            .fetch_one(executor)
            .await
    }

    /// Overwrite name and status of an active campaign.
    ///
    /// Returns `None` if no active campaign has this id.
    pub async fn update_fields<'e>(
        executor: impl PgExecutor<'e>,
        campaign: &CampaignSnapshot,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET name = $2, status = $3, last_updated = now()
             WHERE id = $1 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&campaign.id)
            .bind(&campaign.name)
            .bind(&campaign.status)
            .fetch_optional(executor)
            .await
    }

    /// Soft-delete a campaign. Returns `true` if an active row was flipped.
    pub async fn deactivate<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET is_active = false, last_updated = now()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a campaign by id, active or not.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List active campaigns ordered by name.
    pub async fn list_active<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns WHERE is_active = true ORDER BY name, id"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn count_active<'e>(executor: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM campaigns WHERE is_active = true")
            .fetch_one(executor)
            .await
    }
}
