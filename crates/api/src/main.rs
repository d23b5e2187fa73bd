use std::net::SocketAddr;
use std::sync::Arc;

use leadwatch_delivery::{WebhookConfig, WebhookNotifier};
use leadwatch_lemlist::{LemlistClient, LemlistConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadwatch_api::config::ServerConfig;
use leadwatch_api::router::build_app_router;
use leadwatch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadwatch_api=debug,leadwatch_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = leadwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    leadwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    leadwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let lemlist_config = LemlistConfig::from_env().expect("LEMLIST_API_KEY must be set");
    let source = LemlistClient::new(lemlist_config).expect("Failed to build Lemlist client");

    let webhook_config = WebhookConfig::from_env().expect("WEBHOOK_URL must be set");
    let notifier = WebhookNotifier::new(webhook_config).expect("Failed to build webhook client");
    tracing::info!("Snapshot source and webhook notifier configured");

    // --- Router ---
    let state = AppState::new(pool, config.clone(), Arc::new(source), Arc::new(notifier));
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
