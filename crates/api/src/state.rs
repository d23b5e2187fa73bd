use std::sync::Arc;

use leadwatch_core::notify::CompanyNotifier;
use leadwatch_core::source::SnapshotSource;
use leadwatch_sync::{PushTracker, Reconciler};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the collaborators sit behind `Arc` and the engine
/// handles only hold a pool.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: leadwatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Where campaign and lead snapshots come from.
    pub source: Arc<dyn SnapshotSource>,
    /// Where pushed company names are delivered.
    pub notifier: Arc<dyn CompanyNotifier>,
    pub reconciler: Reconciler,
    pub push_tracker: PushTracker,
}

impl AppState {
    pub fn new(
        pool: leadwatch_db::DbPool,
        config: ServerConfig,
        source: Arc<dyn SnapshotSource>,
        notifier: Arc<dyn CompanyNotifier>,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(pool.clone()),
            push_tracker: PushTracker::new(pool.clone()),
            pool,
            config: Arc::new(config),
            source,
            notifier,
        }
    }
}
