use super::{Collection, CounterStore, ScoreStore, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;

/// In-process score store
///
/// Used when `RATING_STORE=memory` and by tests. Each entry update holds the
/// shard lock for its key, so increments on one member are atomic like
/// ZINCRBY. Rank order matches ZREVRANGE, including its tie-break (equal
/// scores ordered by member string, descending).
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    scores: DashMap<(Collection, i64), f64>,
    counters: DashMap<String, i64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members recorded in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.scores
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .count()
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn get_score(&self, collection: Collection, id: i64) -> StoreResult<Option<f64>> {
        Ok(self.scores.get(&(collection, id)).map(|score| *score))
    }

    async fn increment_score(
        &self,
        collection: Collection,
        id: i64,
        amount: f64,
    ) -> StoreResult<f64> {
        let mut score = self.scores.entry((collection, id)).or_insert(0.0);
        *score += amount;
        Ok(*score)
    }

    async fn ranked_ids(&self, collection: Collection) -> StoreResult<Vec<i64>> {
        let mut members: Vec<(String, f64)> = self
            .scores
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| (entry.key().1.to_string(), *entry.value()))
            .collect();

        members.sort_by(|(member_a, score_a), (member_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| member_b.cmp(member_a))
        });

        Ok(members
            .into_iter()
            .filter_map(|(member, _)| member.parse().ok())
            .collect())
    }

    async fn remove_member(&self, collection: Collection, id: i64) -> StoreResult<()> {
        self.scores.remove(&(collection, id));
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryScoreStore {
    async fn increment_counter(&self, key: &str) -> StoreResult<i64> {
        let mut value = self.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn get_counter(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(self.counters.get(key).map(|value| *value))
    }
}
