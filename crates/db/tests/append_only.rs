//! Integration tests for the append-only tables and the sync history.
//!
//! Verifies that:
//! - The change log orders newest-first with an id tie-break and honours
//!   its limit and campaign filter
//! - UPDATE and DELETE on `change_log` and `pushed_companies` are rejected
//! - The pushed set only grows and ignores duplicates
//! - Sync runs are written in two phases

use std::collections::BTreeSet;

use leadwatch_core::change_log::ChangeType;
use leadwatch_db::models::change_log::{ChangeLogQuery, CreateChangeLogEntry};
use leadwatch_db::models::sync_run::{CompleteSyncRun, CreateSyncRun};
use leadwatch_db::repositories::{ChangeLogRepo, PushedCompanyRepo, SyncRunRepo};
use sqlx::PgPool;

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Change log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_log_lists_newest_first(pool: PgPool) {
    for id in ["A", "B", "C"] {
        ChangeLogRepo::append(
            &pool,
            &CreateChangeLogEntry::campaign(ChangeType::CampaignAdded, id, id),
        )
        .await
        .unwrap();
    }

    let entries = ChangeLogRepo::list_recent(&pool, &ChangeLogQuery::default())
        .await
        .unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.campaign_id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["C", "B", "A"]);
    assert!(entries.windows(2).all(|w| w[0].id > w[1].id));
    assert_eq!(entries[0].kind(), Some(ChangeType::CampaignAdded));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_log_ties_break_on_id(pool: PgPool) {
    // Pin every timestamp to the same instant so only the id orders them.
    let mut conn = pool.acquire().await.unwrap();
    let batch: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|id| CreateChangeLogEntry::campaign(ChangeType::CampaignAdded, id, id))
        .collect();
    ChangeLogRepo::append_batch(&mut conn, &batch).await.unwrap();
    sqlx::query("ALTER TABLE change_log DISABLE TRIGGER trg_change_log_append_only")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE change_log SET change_timestamp = '2026-01-01T00:00:00Z'")
        .execute(&pool)
        .await
        .unwrap();

    let entries = ChangeLogRepo::list_recent(&pool, &ChangeLogQuery::default())
        .await
        .unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.campaign_id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["C", "B", "A"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_log_respects_limit_and_filter(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let batch: Vec<_> = (0..10)
        .map(|i| {
            let campaign = if i % 2 == 0 { "A" } else { "B" };
            CreateChangeLogEntry::campaign(ChangeType::CompanyCountChanged, campaign, campaign)
                .with_values(i, i + 1)
        })
        .collect();
    assert_eq!(ChangeLogRepo::append_batch(&mut conn, &batch).await.unwrap(), 10);

    let limited = ChangeLogRepo::list_recent(
        &pool,
        &ChangeLogQuery {
            limit: Some(3),
            campaign_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(limited.len(), 3);
    assert_eq!(limited[0].old_value.as_deref(), Some("9"));

    let only_a = ChangeLogRepo::list_recent(
        &pool,
        &ChangeLogQuery {
            limit: Some(0),
            campaign_id: Some("A".to_string()),
        },
    )
    .await
    .unwrap();
    // A zero limit is clamped up to one.
    assert_eq!(only_a.len(), 1);
    assert_eq!(only_a[0].campaign_id.as_deref(), Some("A"));
    assert_eq!(only_a[0].old_value.as_deref(), Some("8"));

    assert_eq!(ChangeLogRepo::count(&pool).await.unwrap(), 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_log_rejects_update_and_delete(pool: PgPool) {
    let entry = ChangeLogRepo::append(
        &pool,
        &CreateChangeLogEntry::new(ChangeType::PushAll).with_details("Pushed 2 companies to webhook"),
    )
    .await
    .unwrap();

    let update = sqlx::query("UPDATE change_log SET details = 'edited' WHERE id = $1")
        .bind(entry.id)
        .execute(&pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM change_log WHERE id = $1")
        .bind(entry.id)
        .execute(&pool)
        .await;
    assert!(delete.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_log_rejects_unknown_type(pool: PgPool) {
    let result = sqlx::query("INSERT INTO change_log (change_type) VALUES ('lead_merged')")
        .execute(&pool)
        .await;
    let err = result.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("ck_change_log_change_type"));
}

// ---------------------------------------------------------------------------
// Pushed companies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pushed_set_only_grows(pool: PgPool) {
    assert!(PushedCompanyRepo::pushed_set(&pool, "A").await.unwrap().is_empty());

    let first = PushedCompanyRepo::mark_pushed(&pool, "A", &names(&["Acme", "Beta"]))
        .await
        .unwrap();
    assert_eq!(first, 2);

    let second = PushedCompanyRepo::mark_pushed(&pool, "A", &names(&["Beta", "Gamma"]))
        .await
        .unwrap();
    assert_eq!(second, 1);

    assert_eq!(
        PushedCompanyRepo::pushed_set(&pool, "A").await.unwrap(),
        names(&["Acme", "Beta", "Gamma"])
    );
    assert!(PushedCompanyRepo::pushed_set(&pool, "B").await.unwrap().is_empty());
    assert_eq!(
        PushedCompanyRepo::list_for_campaign(&pool, "A").await.unwrap().len(),
        3
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pushed_companies_reject_delete(pool: PgPool) {
    PushedCompanyRepo::mark_pushed(&pool, "A", &names(&["Acme"]))
        .await
        .unwrap();
    let delete = sqlx::query("DELETE FROM pushed_companies WHERE campaign_id = 'A'")
        .execute(&pool)
        .await;
    assert!(delete.is_err());
    assert_eq!(PushedCompanyRepo::pushed_set(&pool, "A").await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Sync runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_run_is_written_in_two_phases(pool: PgPool) {
    let run = SyncRunRepo::create(
        &pool,
        &CreateSyncRun {
            campaigns_processed: 3,
            campaigns_added: 2,
            campaigns_removed: 1,
            campaigns_updated: 0,
        },
    )
    .await
    .unwrap();
    assert!(!run.is_complete());
    assert_eq!(run.sync_type, "incremental");
    assert_eq!(run.campaigns_added, 2);
    assert_eq!(run.leads_added, 0);

    let done = SyncRunRepo::complete(
        &pool,
        run.id,
        &CompleteSyncRun {
            leads_processed: 10,
            leads_added: 4,
            leads_removed: 1,
            leads_updated: 2,
            duration_seconds: 1.5,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(done.is_complete());
    assert_eq!(done.leads_added, 4);
    assert_eq!(done.campaigns_added, 2);

    // A second completion is refused.
    let again = SyncRunRepo::complete(&pool, run.id, &CompleteSyncRun::default())
        .await
        .unwrap();
    assert!(again.is_none());

    let latest = SyncRunRepo::find_latest(&pool).await.unwrap().unwrap();
    assert_eq!(latest.id, run.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_history_lists_newest_first(pool: PgPool) {
    let mut ids = Vec::new();
    for n in 0..3 {
        let run = SyncRunRepo::create(
            &pool,
            &CreateSyncRun {
                campaigns_processed: n,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ids.push(run.id);
    }

    let history = SyncRunRepo::list_recent(&pool, Some(2)).await.unwrap();
    assert_eq!(history.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);
    assert!(SyncRunRepo::find_by_id(&pool, ids[0]).await.unwrap().is_some());
}
