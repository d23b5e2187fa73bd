use std::sync::Arc;

use leadwatch_lemlist::{LemlistClient, LemlistConfig};
use leadwatch_sync::Reconciler;
use leadwatch_worker::{SyncScheduler, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadwatch_worker=debug,leadwatch_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = leadwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    leadwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let lemlist_config = LemlistConfig::from_env().expect("LEMLIST_API_KEY must be set");
    let source = LemlistClient::new(lemlist_config).expect("Failed to build Lemlist client");

    let scheduler = SyncScheduler::new(Reconciler::new(pool), Arc::new(source), config);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    shutdown_signal().await;
    cancel.cancel();
    // An in-flight pass finishes before the loop observes the cancellation.
    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Sync scheduler task panicked");
    }
    tracing::info!("Worker stopped");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
