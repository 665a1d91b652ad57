use super::{Collection, CounterStore, ScoreStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Redis-backed score store
///
/// Commands:
/// - ZSCORE / ZINCRBY / ZREVRANGE 0 -1 / ZREM on the rating sorted sets
/// - INCR / GET on the view counters
///
/// Every command runs under a per-call deadline. The connection manager is
/// cloned per call; clones share one multiplexed connection and reconnect on
/// their own after a dropped socket.
#[derive(Clone)]
pub struct RedisScoreStore {
    redis: ConnectionManager,
    timeout: Duration,
}

impl RedisScoreStore {
    pub fn new(redis: ConnectionManager, timeout: Duration) -> Self {
        Self { redis, timeout }
    }

    /// Open a connection manager for `redis_url`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await.map_err(store_error)?;
        Ok(Self::new(manager, timeout))
    }

    async fn timed<T, F>(&self, command: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(command, error = %err, "Redis command failed");
                Err(store_error(err))
            }
            Err(_) => {
                warn!(
                    command,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Redis command timed out"
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

/// A refused connection means the server is down, not that the command was bad.
fn store_error(err: RedisError) -> StoreError {
    if err.is_connection_refusal() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Redis(err)
    }
}

#[async_trait]
impl ScoreStore for RedisScoreStore {
    async fn get_score(&self, collection: Collection, id: i64) -> StoreResult<Option<f64>> {
        let mut conn = self.redis.clone();
        let score: Option<f64> = self
            .timed("ZSCORE", conn.zscore(collection.key(), id))
            .await?;
        Ok(score)
    }

    async fn increment_score(
        &self,
        collection: Collection,
        id: i64,
        amount: f64,
    ) -> StoreResult<f64> {
        let mut conn = self.redis.clone();
        let score: f64 = self
            .timed("ZINCRBY", conn.zincr(collection.key(), id, amount))
            .await?;
        Ok(score)
    }

    async fn ranked_ids(&self, collection: Collection) -> StoreResult<Vec<i64>> {
        let mut conn = self.redis.clone();
        let members: Vec<String> = self
            .timed("ZREVRANGE", conn.zrevrange(collection.key(), 0, -1))
            .await?;

        let ids = members
            .into_iter()
            .filter_map(|member| match member.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(%collection, member = %member, "Skipping non-numeric rating member");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(%collection, member_count = ids.len(), "Loaded rank order");
        Ok(ids)
    }

    async fn remove_member(&self, collection: Collection, id: i64) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        let removed: i64 = self
            .timed("ZREM", conn.zrem(collection.key(), id))
            .await?;
        debug!(%collection, id, removed, "Removed rating member");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        let cmd = redis::cmd("PING");
        let _: String = self
            .timed("PING", cmd.query_async::<_, String>(&mut conn))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisScoreStore {
    async fn increment_counter(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.redis.clone();
        let value: i64 = self.timed("INCR", conn.incr(key, 1_i64)).await?;
        Ok(value)
    }

    async fn get_counter(&self, key: &str) -> StoreResult<Option<i64>> {
        let mut conn = self.redis.clone();
        let value: Option<i64> = self.timed("GET", conn.get(key)).await?;
        Ok(value)
    }
}
