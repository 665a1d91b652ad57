//! Score Store Health Check Background Job
//!
//! Periodically pings the score store so a dead Redis connection shows up in
//! the logs before a like or subscribe request fails on it. Each ping also
//! gives the connection manager a chance to reconnect during quiet periods.

use crate::config::HealthConfig;
use crate::store::ScoreStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Delay before the first ping, letting the rest of the process start up
const INITIAL_DELAY: Duration = Duration::from_secs(10);

/// Consecutive failures before the log level escalates to error
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Run the health check until `shutdown` changes.
pub async fn start_redis_health_check(
    store: Arc<dyn ScoreStore>,
    config: HealthConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    if !config.enabled {
        tracing::info!("Score store health check disabled by configuration");
        return;
    }

    tracing::info!(
        interval_secs = config.check_interval.as_secs(),
        "Starting score store health check background job"
    );

    tokio::select! {
        _ = sleep(INITIAL_DELAY) => {}
        _ = shutdown.changed() => return,
    }

    let mut consecutive_failures = 0;

    loop {
        consecutive_failures = check_once(store.as_ref(), consecutive_failures).await;

        tokio::select! {
            _ = sleep(config.check_interval) => {}
            _ = shutdown.changed() => {
                tracing::info!("Score store health check shutting down");
                return;
            }
        }
    }
}

/// Ping once and return the updated consecutive failure count.
async fn check_once(store: &dyn ScoreStore, consecutive_failures: u32) -> u32 {
    match store.ping().await {
        Ok(()) => {
            if consecutive_failures > 0 {
                tracing::info!(
                    previous_failures = consecutive_failures,
                    "Score store connection recovered"
                );
            }
            tracing::debug!("Score store health check: OK");
            0
        }
        Err(e) => {
            let consecutive_failures = consecutive_failures + 1;
            if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                tracing::error!(
                    consecutive_failures = consecutive_failures,
                    error = %e,
                    "Score store health check: CRITICAL - multiple consecutive failures"
                );
            } else {
                tracing::warn!(
                    consecutive_failures = consecutive_failures,
                    error = %e,
                    "Score store health check: FAILED"
                );
            }
            consecutive_failures
        }
    }
}
