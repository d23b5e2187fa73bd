//! Repository for the `leads` table.

use leadwatch_core::snapshot::LeadSnapshot;
use sqlx::{PgConnection, PgExecutor};

use crate::models::lead::Lead;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    campaign_id, id, email, first_name, last_name, company_name, \
    job_title, linkedin_url, state, state_system, \
    created_at, last_updated, is_active";

/// Column list for INSERT (excludes defaulted timestamps and `is_active`).
const INSERT_COLUMNS: &str = "\
    campaign_id, id, email, first_name, last_name, company_name, \
    job_title, linkedin_url, state, state_system";

const INSERT_COLUMN_COUNT: usize = 10;

/// Rows per multi-row INSERT; keeps bind parameters well under the
/// Postgres limit of 65535.
const INSERT_CHUNK_SIZE: usize = 1000;

/// Re-inserting a soft-deleted lead reactivates it with the new values.
const UPSERT_CLAUSE: &str = "\
    ON CONFLICT (campaign_id, id) DO UPDATE SET \
        email = EXCLUDED.email, \
        first_name = EXCLUDED.first_name, \
        last_name = EXCLUDED.last_name, \
        company_name = EXCLUDED.company_name, \
        job_title = EXCLUDED.job_title, \
        linkedin_url = EXCLUDED.linkedin_url, \
        state = EXCLUDED.state, \
        state_system = EXCLUDED.state_system, \
        is_active = true, \
        last_updated = now()";

/// Provides CRUD operations for leads. Rows are never deleted.
pub struct LeadRepo;

impl LeadRepo {
    /// Insert or reactivate a single lead.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        lead: &LeadSnapshot,
    ) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads ({INSERT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             {UPSERT_CLAUSE}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&lead.campaign_id)
            .bind(&lead.id)
            .bind(&lead.email)
            .bind(&lead.first_name)
            .bind(&lead.last_name)
            .bind(&lead.company_name)
            .bind(&lead.job_title)
            .bind(&lead.linkedin_url)
            .bind(&lead.state)
            .bind(&lead.state_system)
            .fetch_one(executor)
            .await
    }

    /// Batch insert or reactivate leads.
    ///
    /// Uses one multi-row INSERT per chunk. Ids must be unique within
    /// `leads`. Returns the number of rows written.
    pub async fn upsert_batch(
        conn: &mut PgConnection,
        leads: &[LeadSnapshot],
    ) -> Result<u64, sqlx::Error> {
        let mut written = 0;
        for chunk in leads.chunks(INSERT_CHUNK_SIZE) {
            let query = format!(
                "INSERT INTO leads ({INSERT_COLUMNS}) VALUES {} {UPSERT_CLAUSE}",
                values_placeholders(chunk.len(), INSERT_COLUMN_COUNT)
            );
            let mut q = sqlx::query(&query);
            for lead in chunk {
                q = q
                    .bind(&lead.campaign_id)
                    .bind(&lead.id)
                    .bind(&lead.email)
                    .bind(&lead.first_name)
                    .bind(&lead.last_name)
                    .bind(&lead.company_name)
                    .bind(&lead.job_title)
                    .bind(&lead.linkedin_url)
                    .bind(&lead.state)
                    .bind(&lead.state_system);
            }
            written += q.execute(&mut *conn).await?.rows_affected();
        }
        Ok(written)
    }

    /// Overwrite the tracked fields of an active lead.
    /// Returns `true` if a row was updated.
    pub async fn update_fields<'e>(
        executor: impl PgExecutor<'e>,
        lead: &LeadSnapshot,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE leads SET
                email = $3, first_name = $4, last_name = $5, company_name = $6,
                job_title = $7, linkedin_url = $8, state = $9, state_system = $10,
                last_updated = now()
             WHERE campaign_id = $1 AND id = $2 AND is_active = true",
        )
        .bind(&lead.campaign_id)
        .bind(&lead.id)
        .bind(&lead.email)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.company_name)
        .bind(&lead.job_title)
        .bind(&lead.linkedin_url)
        .bind(&lead.state)
        .bind(&lead.state_system)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a lead. Returns `true` if an active row was flipped.
    pub async fn deactivate<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
        id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE leads SET is_active = false, last_updated = now()
             WHERE campaign_id = $1 AND id = $2 AND is_active = true",
        )
        .bind(campaign_id)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a lead by key, active or not.
    pub async fn find<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
        id: &str,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE campaign_id = $1 AND id = $2");
        sqlx::query_as::<_, Lead>(&query)
            .bind(campaign_id)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List the active leads of a campaign ordered by id.
    pub async fn list_active_for_campaign<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leads
             WHERE campaign_id = $1 AND is_active = true
             ORDER BY id"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(campaign_id)
            .fetch_all(executor)
            .await
    }

    pub async fn count_active<'e>(executor: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE is_active = true")
            .fetch_one(executor)
            .await
    }
}

/// `($1, $2), ($3, $4), ...` for `rows` rows of `columns` parameters.
pub(crate) fn values_placeholders(rows: usize, columns: usize) -> String {
    let mut out = String::new();
    let mut param_idx = 1usize;
    for row in 0..rows {
        if row > 0 {
            out.push_str(", ");
        }
        out.push('(');
        for col in 0..columns {
            if col > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("${param_idx}"));
            param_idx += 1;
        }
        out.push(')');
    }
    out
}
