//! Repository for the append-only `change_log` table.

use leadwatch_core::pagination::{clamp_limit, DEFAULT_CHANGE_LOG_LIMIT, MAX_CHANGE_LOG_LIMIT};
use sqlx::{PgConnection, PgExecutor};

use super::lead_repo::values_placeholders;
use crate::models::change_log::{ChangeLogEntry, ChangeLogQuery, CreateChangeLogEntry};

/// Column list for SELECT queries.
const COLUMNS: &str = "\
    id, change_type, campaign_id, campaign_name, lead_id, lead_email, \
    lead_company, old_value, new_value, details, change_timestamp";

/// Column list for INSERT (excludes generated `id` and `change_timestamp`).
const INSERT_COLUMNS: &str = "\
    change_type, campaign_id, campaign_name, lead_id, lead_email, \
    lead_company, old_value, new_value, details";

const INSERT_COLUMN_COUNT: usize = 9;

const INSERT_CHUNK_SIZE: usize = 1000;

/// Provides append and query operations for the change log.
///
/// No update or delete methods exist; the table's trigger
/// rejects both.
pub struct ChangeLogRepo;

impl ChangeLogRepo {
    /// Append one entry. The database assigns id and timestamp.
    pub async fn append<'e>(
        executor: impl PgExecutor<'e>,
        entry: &CreateChangeLogEntry,
    ) -> Result<ChangeLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_log ({INSERT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeLogEntry>(&query)
            .bind(entry.change_type.as_str())
            .bind(&entry.campaign_id)
            .bind(&entry.campaign_name)
            .bind(&entry.lead_id)
            .bind(&entry.lead_email)
            .bind(&entry.lead_company)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.details)
            .fetch_one(executor)
            .await
    }

    /// Batch append entries, preserving slice order in id order.
    ///
    /// Returns the number of rows written.
    pub async fn append_batch(
        conn: &mut PgConnection,
        entries: &[CreateChangeLogEntry],
    ) -> Result<u64, sqlx::Error> {
        let mut written = 0;
        for chunk in entries.chunks(INSERT_CHUNK_SIZE) {
            let query = format!(
                "INSERT INTO change_log ({INSERT_COLUMNS}) VALUES {}",
                values_placeholders(chunk.len(), INSERT_COLUMN_COUNT)
            );
            let mut q = sqlx::query(&query);
            for entry in chunk {
                q = q
                    .bind(entry.change_type.as_str())
                    .bind(&entry.campaign_id)
                    .bind(&entry.campaign_name)
                    .bind(&entry.lead_id)
                    .bind(&entry.lead_email)
                    .bind(&entry.lead_company)
                    .bind(&entry.old_value)
                    .bind(&entry.new_value)
                    .bind(&entry.details);
            }
            written += q.execute(&mut *conn).await?.rows_affected();
        }
        Ok(written)
    }

    /// Most recent entries, newest first, ties broken by descending id.
    ///
    /// `limit` defaults to 50 and is clamped to `[1, 500]`.
    pub async fn list_recent<'e>(
        executor: impl PgExecutor<'e>,
        params: &ChangeLogQuery,
    ) -> Result<Vec<ChangeLogEntry>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_CHANGE_LOG_LIMIT, MAX_CHANGE_LOG_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM change_log
             WHERE ($1::TEXT IS NULL OR campaign_id = $1)
             ORDER BY change_timestamp DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ChangeLogEntry>(&query)
            .bind(&params.campaign_id)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    pub async fn count<'e>(executor: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM change_log")
            .fetch_one(executor)
            .await
    }
}
