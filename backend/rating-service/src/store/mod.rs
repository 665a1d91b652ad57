//! Score store contracts
//!
//! The rating engine never talks to Redis directly. It goes through
//! [`ScoreStore`] (sorted-set primitives) and [`CounterStore`] (plain integer
//! counters) so services can be injected with either the Redis backend or the
//! in-process backend used for local development and tests.
//!
//! Key layout (shared with every deployment reading the same Redis):
//! - `user_rating`, `article_rating`: sorted sets, member = entity id, score = accumulated weight
//! - `article:{id}:id`: integer view counter per article

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod memory;
mod redis_store;

pub use self::memory::MemoryScoreStore;
pub use self::redis_store::RedisScoreStore;

/// Rating namespace inside the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    UserRating,
    ArticleRating,
}

impl Collection {
    /// Sorted-set key holding the collection
    pub fn key(self) -> &'static str {
        match self {
            Collection::UserRating => "user_rating",
            Collection::ArticleRating => "article_rating",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Score store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Per-call deadline exceeded
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend refused the connection (Redis down) or otherwise cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the caller may retry the triggering action.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Redis(err) => {
                err.is_io_error()
                    || err.is_connection_dropped()
                    || err.is_connection_refusal()
                    || err.is_timeout()
            }
            StoreError::Timeout(_) | StoreError::Unavailable(_) => true,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Sorted-set primitives the rating engine is built on.
///
/// Increments must be atomic on the backend side: concurrent callers adding
/// to the same member never lose updates.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Current score, `None` if the member was never recorded.
    async fn get_score(&self, collection: Collection, id: i64) -> StoreResult<Option<f64>>;

    /// Add `amount` (may be negative) to the member, creating it at `amount`
    /// when absent. Returns the new score.
    async fn increment_score(&self, collection: Collection, id: i64, amount: f64)
        -> StoreResult<f64>;

    /// All member ids, highest score first.
    async fn ranked_ids(&self, collection: Collection) -> StoreResult<Vec<i64>>;

    /// Remove a member. Removing a non-member is not an error.
    async fn remove_member(&self, collection: Collection, id: i64) -> StoreResult<()>;

    /// Liveness probe
    async fn ping(&self) -> StoreResult<()>;
}

/// Plain monotonic counters living next to the rating collections.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment_counter(&self, key: &str) -> StoreResult<i64>;

    async fn get_counter(&self, key: &str) -> StoreResult<Option<i64>>;
}
