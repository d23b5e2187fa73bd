//! Sync run models.
//!
//! A sync run row is written in two phases: inserted with the campaign
//! counts once the campaign diff commits, then completed with the lead
//! counts and duration. A row whose `duration_seconds` is still NULL
//! belongs to a pass that never finished its lead phase.

use leadwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Well-known `sync_type` values.
pub mod sync_types {
    pub const INCREMENTAL: &str = "incremental";
}

/// A row from the `sync_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncRun {
    pub id: DbId,
    pub sync_type: String,
    pub campaigns_processed: i32,
    pub leads_processed: i32,
    pub campaigns_added: i32,
    pub campaigns_removed: i32,
    pub campaigns_updated: i32,
    pub leads_added: i32,
    pub leads_removed: i32,
    pub leads_updated: i32,
    pub sync_timestamp: Timestamp,
    pub duration_seconds: Option<f64>,
}

impl SyncRun {
    pub fn is_complete(&self) -> bool {
        self.duration_seconds.is_some()
    }
}

/// Phase one: campaign counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSyncRun {
    pub campaigns_processed: i32,
    pub campaigns_added: i32,
    pub campaigns_removed: i32,
    pub campaigns_updated: i32,
}

/// Phase two: lead counts and wall-clock duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompleteSyncRun {
    pub leads_processed: i32,
    pub leads_added: i32,
    pub leads_removed: i32,
    pub leads_updated: i32,
    pub duration_seconds: f64,
}

/// Aggregate figures for the sync dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStats {
    pub active_campaigns: i64,
    pub active_leads: i64,
    pub total_changes: i64,
    pub last_sync: Option<SyncRun>,
}
