/// Configuration management for Rating Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Score store configuration
    pub store: StoreConfig,
    /// Store health check configuration
    pub health: HealthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// `text` or `json` log output
    pub log_format: LogFormat,
    /// Number of top entries logged in the startup ranking snapshot
    pub snapshot_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Score store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Redis URL (redis://host:port/db), required for the redis backend
    pub redis_url: Option<String>,
    /// Per-command deadline
    pub timeout: Duration,
}

/// Store health check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub enabled: bool,
    pub check_interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: Duration::from_secs(default_health_interval_secs()),
        }
    }
}

// Default values
fn default_timeout_ms() -> u64 {
    500
}

fn default_health_interval_secs() -> u64 {
    60
}

fn default_snapshot_size() -> usize {
    10
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let log_format = match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "text".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            log_format,
            snapshot_size: parse_env("RANKING_SNAPSHOT_SIZE")?
                .unwrap_or_else(default_snapshot_size),
        };

        let backend = match std::env::var("RATING_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "redis" => StoreBackend::Redis,
            "memory" => StoreBackend::Memory,
            other => bail!("RATING_STORE must be 'redis' or 'memory', got '{}'", other),
        };

        let redis_url = match backend {
            StoreBackend::Redis => Some(
                std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
            ),
            StoreBackend::Memory => std::env::var("REDIS_URL").ok(),
        };

        let store = StoreConfig {
            backend,
            redis_url,
            timeout: Duration::from_millis(
                parse_env("RATING_STORE_TIMEOUT_MS")?.unwrap_or_else(default_timeout_ms),
            ),
        };

        let health_defaults = HealthConfig::default();
        let health = HealthConfig {
            enabled: parse_env("REDIS_HEALTH_CHECK_ENABLED")?.unwrap_or(health_defaults.enabled),
            check_interval: parse_env("REDIS_HEALTH_CHECK_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(health_defaults.check_interval),
        };

        Ok(Config { app, store, health })
    }
}
