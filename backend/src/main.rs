mod config;

use config::Config;
use pickban::draft::{RandomChooser, TimerController};
use pickban::items::ItemRepository;
use pickban::scheduler::{LocalScheduler, run_expiry_sweeper, run_timeout_worker};
use pickban::service::DraftService;
use pickban::store::SqliteLobbyStore;
use std::error::Error;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let addr = config.addr();

    let pool = sqlx::SqlitePool::connect(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let items = ItemRepository::new(pool.clone()).load().await?;
    if items.is_empty() {
        tracing::warn!("Item pool is empty, timed out turns cannot be resolved until it is seeded");
    } else {
        tracing::info!(items = items.len(), "Loaded item pool");
    }

    let (scheduler, fired) = LocalScheduler::new();
    let timer = TimerController::new(scheduler).with_buffer(config.schedule_buffer);
    let service = Arc::new(DraftService::new(
        SqliteLobbyStore::new(pool),
        timer,
        items,
        RandomChooser,
    ));

    tokio::spawn(run_timeout_worker(
        Arc::clone(&service),
        fired,
        config.timeout_retry_attempts,
    ));
    tokio::spawn(run_expiry_sweeper(
        Arc::clone(&service),
        config.expiry_sweep_interval,
    ));
    service.recover_deadlines().await?;

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, pickban::app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
