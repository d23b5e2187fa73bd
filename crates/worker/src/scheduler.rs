use std::sync::Arc;
use std::time::Duration;

use leadwatch_core::source::SnapshotSource;
use leadwatch_sync::{PassReport, Reconciler, SyncError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;

/// Periodic driver for [`Reconciler::run_pass`].
pub struct SyncScheduler {
    reconciler: Reconciler,
    source: Arc<dyn SnapshotSource>,
    config: WorkerConfig,
}

impl SyncScheduler {
    pub fn new(reconciler: Reconciler, source: Arc<dyn SnapshotSource>, config: WorkerConfig) -> Self {
        Self {
            reconciler,
            source,
            config,
        }
    }

    /// Run one pass and log its outcome. A failed pass is logged and the
    /// schedule continues.
    pub async fn run_once(&self) -> Result<PassReport, SyncError> {
        let result = self.reconciler.run_pass(self.source.as_ref()).await;
        match &result {
            Ok(report) if !report.failures.is_empty() => {
                tracing::warn!(
                    sync_run_id = report.sync_run_id,
                    failures = report.failures.len(),
                    "Scheduled pass completed with skipped records"
                );
            }
            Ok(report) => {
                tracing::debug!(sync_run_id = report.sync_run_id, "Scheduled pass completed");
            }
            Err(SyncError::Fetch(e)) => {
                tracing::warn!(error = %e, source = self.source.source_name(), "Scheduled pass skipped, source unavailable");
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled pass failed");
            }
        }
        result
    }

    /// Run passes every `sync_interval` until `cancel` is triggered.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.sync_interval.as_secs(),
            sync_on_start = self.config.sync_on_start,
            "Sync scheduler started"
        );

        let start = if self.config.sync_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + self.config.sync_interval
        };
        let mut interval = tokio::time::interval_at(start, self.config.sync_interval);
        // A pass longer than the interval delays the next one instead of
        // queueing a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sync scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    let _ = self.run_once().await;
                }
            }
        }
    }
}
