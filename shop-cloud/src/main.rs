//! shop-cloud: back-office HTTP service

use std::time::Duration;

use shop_cloud::db::DbService;
use shop_cloud::mq::spawn_event_log;
use shop_cloud::{AppState, Config, api, logger};
use tokio_util::sync::CancellationToken;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Starting shop-cloud (env: {})", config.environment);

    let db = DbService::new(&config.database_url).await?;
    db.health_check().await?;

    let state = AppState::new(&config, db.pool.clone());
    let app = api::create_router(state.clone());

    // Periodic expired-entry cleanup for the in-memory cache
    let shutdown = CancellationToken::new();
    let cleanup_token = shutdown.clone();
    let cache = state.cache.clone();
    let cleanup = tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = cleanup_token.cancelled() => break,
                _ = interval.tick() => {
                    let removed = cache.cleanup().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Expired cache entries removed");
                    }
                }
            }
        }
    });

    let event_log = state
        .events
        .as_ref()
        .map(|events| spawn_event_log(events, shutdown.clone()));

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("shop-cloud HTTP listening on {http_addr}");

    let server_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutdown signal received");
            server_token.cancel();
        })
        .await?;

    shutdown.cancel();
    cleanup.await?;
    if let Some(event_log) = event_log {
        let seen = event_log.await?;
        tracing::info!(events = seen, "Event log stopped");
    }
    db.pool.close().await;
    tracing::info!("shop-cloud stopped");
    Ok(())
}
