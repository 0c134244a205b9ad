use std::sync::Arc;

use anyhow::Context;
use arena_engine::{EngineConfig, PgStore, SalesEngine, SeasonEngine, SystemClock};
use arena_worker::{Scheduler, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_worker=info,arena_engine=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env().context("Invalid worker configuration")?;
    let engine_config = Arc::new(EngineConfig::from_env().context("Invalid engine configuration")?);
    tracing::info!(
        interval_secs = config.scheduler_interval.as_secs(),
        auto_distribute_rewards = config.auto_distribute_rewards,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = arena_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    arena_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    arena_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Engines ---
    let store = PgStore::new(pool);
    let clock = Arc::new(SystemClock);
    let scheduler = Scheduler::new(
        SeasonEngine::new(store.clone(), clock.clone(), engine_config.clone()),
        SalesEngine::new(store, clock, engine_config),
        config.scheduler_interval,
        config.auto_distribute_rewards,
    );

    // --- Shutdown ---
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    scheduler.run(cancel).await;
    tracing::info!("Worker stopped");
    Ok(())
}
