//! Repository for the append-only `pushed_companies` table.

use std::collections::BTreeSet;

use sqlx::PgExecutor;

use crate::models::pushed_company::PushedCompany;

const COLUMNS: &str = "id, campaign_id, company_name, pushed_at";

/// Provides read and mark operations for the per-campaign pushed set.
pub struct PushedCompanyRepo;

impl PushedCompanyRepo {
    /// The set of company names ever pushed for a campaign.
    pub async fn pushed_set<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
    ) -> Result<BTreeSet<String>, sqlx::Error> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT company_name FROM pushed_companies WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_all(executor)
        .await?;
        Ok(names.into_iter().collect())
    }

    /// Union `companies` into the pushed set. Names already present are
    /// skipped. Returns the number of newly recorded names.
    pub async fn mark_pushed<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
        companies: &BTreeSet<String>,
    ) -> Result<u64, sqlx::Error> {
        let names: Vec<&str> = companies.iter().map(String::as_str).collect();
        let result = sqlx::query(
            "INSERT INTO pushed_companies (campaign_id, company_name)
             SELECT $1, name FROM UNNEST($2::TEXT[]) AS name
             ON CONFLICT ON CONSTRAINT uq_pushed_companies_campaign_company DO NOTHING",
        )
        .bind(campaign_id)
        .bind(&names)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Pushed rows for a campaign, oldest first.
    pub async fn list_for_campaign<'e>(
        executor: impl PgExecutor<'e>,
        campaign_id: &str,
    ) -> Result<Vec<PushedCompany>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pushed_companies
             WHERE campaign_id = $1
             ORDER BY pushed_at, id"
        );
        sqlx::query_as::<_, PushedCompany>(&query)
            .bind(campaign_id)
            .fetch_all(executor)
            .await
    }
}
