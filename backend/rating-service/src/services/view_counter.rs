use crate::error::RatingResult;
use crate::store::CounterStore;
use std::sync::Arc;

/// Per-article view counter
///
/// Keys: article:{article_id}:id
///
/// Views only go up. Reading an unknown article returns 0 without writing
/// anything; this is a counter, not a rating member.
#[derive(Clone)]
pub struct ViewCounter {
    store: Arc<dyn CounterStore>,
}

impl ViewCounter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    pub fn article_key(article_id: i64) -> String {
        format!("article:{}:id", article_id)
    }

    /// Add one view, returning the new total.
    pub async fn increment_view_count(&self, article_id: i64) -> RatingResult<i64> {
        let count = self
            .store
            .increment_counter(&Self::article_key(article_id))
            .await?;
        Ok(count)
    }

    pub async fn get_view_count(&self, article_id: i64) -> RatingResult<i64> {
        let count = self
            .store
            .get_counter(&Self::article_key(article_id))
            .await?;
        Ok(count.unwrap_or(0))
    }
}
