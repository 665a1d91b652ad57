use anyhow::{Context, Result};
use rating_service::config::{LogFormat, StoreBackend};
use rating_service::workers::redis_health;
use rating_service::{Config, CounterStore, MemoryScoreStore, RatingServices, RedisScoreStore, ScoreStore};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Log the current top of both rankings.
async fn log_ranking_snapshot(services: &RatingServices, size: usize) {
    match services.user_rating.get_range_list_by_rating().await {
        Ok(ids) => info!(
            total = ids.len(),
            top = ?ids.iter().take(size).collect::<Vec<_>>(),
            "User ranking snapshot"
        ),
        Err(e) => warn!(error = %e, "Failed to load user ranking snapshot"),
    }

    match services.article_rating.get_range_list_by_rating().await {
        Ok(ids) => info!(
            total = ids.len(),
            top = ?ids.iter().take(size).collect::<Vec<_>>(),
            "Article ranking snapshot"
        ),
        Err(e) => warn!(error = %e, "Failed to load article ranking snapshot"),
    }
}

async fn run<S>(store: Arc<S>, config: Config) -> Result<()>
where
    S: ScoreStore + CounterStore + 'static,
{
    let services = RatingServices::new(store.clone());
    info!("✅ Rating services initialized");

    log_ranking_snapshot(&services, config.app.snapshot_size).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health_store: Arc<dyn ScoreStore> = store;
    let health = tokio::spawn(redis_health::start_redis_health_check(
        health_store,
        config.health.clone(),
        shutdown_rx,
    ));

    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    health.await.context("health check task panicked")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.log_format);

    info!(
        env = %config.app.env,
        backend = ?config.store.backend,
        timeout_ms = config.store.timeout.as_millis() as u64,
        "Starting rating-service"
    );

    match config.store.backend {
        StoreBackend::Redis => {
            let url = config
                .store
                .redis_url
                .clone()
                .context("REDIS_URL is required for the redis store")?;
            let store = RedisScoreStore::connect(&url, config.store.timeout)
                .await
                .context("Failed to connect to Redis")?;
            store.ping().await.context("Redis did not answer PING")?;
            info!("✅ Redis connection established");
            run(Arc::new(store), config).await
        }
        StoreBackend::Memory => {
            warn!("Using in-memory score store; ratings are lost on restart");
            run(Arc::new(MemoryScoreStore::new()), config).await
        }
    }
}
