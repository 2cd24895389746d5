//! Herald Server — Notification Distribution Engine
//!
//! Main entry point that wires all crates together and runs the engine.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use herald_core::config::AppConfig;
use herald_core::error::AppError;
use herald_core::traits::identity::IdentityProvider;
use herald_core::traits::roster::RosterProvider;
use herald_database::roster::{PgIdentityProvider, PgRosterProvider};
use herald_database::{connection, NotificationStore};
use herald_realtime::Notifier;
use herald_service::{NotificationEngine, PushSink};
use herald_worker::PurgeScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("HERALD_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Herald v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let pool = connection::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    herald_database::migration::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Storage, roster, and identity adapters ───────────
    let store: Arc<dyn NotificationStore> = Arc::new(
        herald_database::postgres::PgNotificationStore::new(pool.clone()),
    );
    let roster: Arc<dyn RosterProvider> = Arc::new(PgRosterProvider::new(pool.clone()));
    let identity: Arc<dyn IdentityProvider> = Arc::new(PgIdentityProvider::new(pool.clone()));

    // ── Step 3: Cache provider ───────────────────────────────────
    let cache = herald_cache::from_config(&config.cache)?;

    // ── Step 4: Realtime push ────────────────────────────────────
    let notifier = Arc::new(Notifier::new(config.realtime.clone()));
    let push: Arc<dyn PushSink> = Arc::clone(&notifier) as Arc<dyn PushSink>;

    // ── Step 5: Engine ───────────────────────────────────────────
    let engine = Arc::new(NotificationEngine::new(
        store,
        roster,
        identity,
        cache,
        push,
        config.fanout.clone(),
        &config.cache,
    ));
    tracing::info!("Notification engine initialized");

    // ── Step 6: Maintenance scheduler ────────────────────────────
    let mut scheduler = PurgeScheduler::new(Arc::clone(&engine), config.worker.clone()).await?;
    scheduler.start().await?;

    // ── Step 7: Wait for shutdown ────────────────────────────────
    tracing::info!("Herald is running, waiting for shutdown signal");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    scheduler.shutdown().await?;
    pool.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Herald shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
