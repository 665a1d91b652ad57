use super::rating::{RatingAction, RatingEngine};
use crate::domain::{ArticleSummary, UserSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Entity that can be placed in a collection's rank order
pub trait Ranked {
    fn rank_id(&self) -> i64;
}

impl Ranked for UserSummary {
    fn rank_id(&self) -> i64 {
        self.id
    }
}

impl Ranked for ArticleSummary {
    fn rank_id(&self) -> i64 {
        self.id
    }
}

/// How far the merge got
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingStatus {
    /// Every item was found in the rank order
    FullyRanked,
    /// Some items have no rank entry; they follow the ranked ones in input order
    PartiallyRanked { missing: Vec<i64> },
    /// The rank order could not be loaded; items are in input order
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct Ranking<T> {
    pub items: Vec<T>,
    pub status: RankingStatus,
}

impl<T> Ranking<T> {
    pub fn is_fully_ranked(&self) -> bool {
        self.status == RankingStatus::FullyRanked
    }
}

/// Order `items` by their position in `rank_order` (highest rating first).
///
/// Items without a rank entry never fail the call: they are appended after
/// the ranked items, keeping their relative input order.
pub fn order_by_rank<T: Ranked>(items: Vec<T>, rank_order: &[i64]) -> Ranking<T> {
    let positions: HashMap<i64, usize> = rank_order
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect();

    let (mut ranked, unranked): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| positions.contains_key(&item.rank_id()));

    ranked.sort_by_key(|item| positions[&item.rank_id()]);

    if unranked.is_empty() {
        return Ranking {
            items: ranked,
            status: RankingStatus::FullyRanked,
        };
    }

    let missing = unranked.iter().map(Ranked::rank_id).collect();
    ranked.extend(unranked);
    Ranking {
        items: ranked,
        status: RankingStatus::PartiallyRanked { missing },
    }
}

/// Reconciles a filtered entity list with a collection's global rank order.
pub struct RankedListMerger<A: RatingAction> {
    rating: Arc<RatingEngine<A>>,
}

impl<A: RatingAction> Clone for RankedListMerger<A> {
    fn clone(&self) -> Self {
        Self {
            rating: self.rating.clone(),
        }
    }
}

impl<A: RatingAction> RankedListMerger<A> {
    pub fn new(rating: Arc<RatingEngine<A>>) -> Self {
        Self { rating }
    }

    /// Best-effort sort by rating. Store failures and missing rank entries
    /// are logged and reported in the status, never returned as errors.
    pub async fn merge<T: Ranked>(&self, items: Vec<T>) -> Ranking<T> {
        let rank_order = match self.rating.get_range_list_by_rating().await {
            Ok(rank_order) => rank_order,
            Err(err) => {
                warn!(
                    collection = %self.rating.collection(),
                    error = %err,
                    item_count = items.len(),
                    "Rank order unavailable, leaving list unsorted"
                );
                return Ranking {
                    items,
                    status: RankingStatus::Unavailable,
                };
            }
        };

        let ranking = order_by_rank(items, &rank_order);
        if let RankingStatus::PartiallyRanked { missing } = &ranking.status {
            warn!(
                collection = %self.rating.collection(),
                missing = ?missing,
                item_count = ranking.items.len(),
                "Rating sort incomplete, some items have no rating"
            );
        }
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rating::{ArticleAction, ArticleRating, UserRating};
    use crate::store::{Collection, ScoreStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Store {}

        #[async_trait]
        impl ScoreStore for Store {
            async fn get_score(&self, collection: Collection, id: i64) -> StoreResult<Option<f64>>;
            async fn increment_score(&self, collection: Collection, id: i64, amount: f64) -> StoreResult<f64>;
            async fn ranked_ids(&self, collection: Collection) -> StoreResult<Vec<i64>>;
            async fn remove_member(&self, collection: Collection, id: i64) -> StoreResult<()>;
            async fn ping(&self) -> StoreResult<()>;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Item(i64);

    impl Ranked for Item {
        fn rank_id(&self) -> i64 {
            self.0
        }
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|item| item.0).collect()
    }

    #[test]
    fn test_order_by_rank_full() {
        let ranking = order_by_rank(vec![Item(1), Item(2), Item(3)], &[2, 3, 1]);

        assert_eq!(ids(&ranking.items), vec![2, 3, 1]);
        assert!(ranking.is_fully_ranked());
    }

    #[test]
    fn test_order_by_rank_uses_global_positions() {
        // Filtered subset of a larger rank order
        let ranking = order_by_rank(vec![Item(7), Item(4)], &[9, 4, 8, 7, 1]);

        assert_eq!(ids(&ranking.items), vec![4, 7]);
        assert_eq!(ranking.status, RankingStatus::FullyRanked);
    }

    #[test]
    fn test_order_by_rank_missing_entry() {
        let ranking = order_by_rank(vec![Item(1), Item(99), Item(2)], &[2, 1]);

        assert_eq!(ids(&ranking.items), vec![2, 1, 99]);
        assert_eq!(
            ranking.status,
            RankingStatus::PartiallyRanked { missing: vec![99] }
        );
    }

    #[test]
    fn test_order_by_rank_empty() {
        let ranking = order_by_rank(Vec::<Item>::new(), &[1, 2]);
        assert!(ranking.items.is_empty());
        assert!(ranking.is_fully_ranked());
    }

    #[tokio::test]
    async fn test_merge_with_store() {
        let store = Arc::new(crate::store::MemoryScoreStore::new());
        let rating = Arc::new(ArticleRating::new(store));
        for (id, likes) in [(10, 1), (20, 3), (30, 2)] {
            for _ in 0..likes {
                rating
                    .increment_or_decrement_rating_by_id(ArticleAction::Like, id)
                    .await
                    .unwrap();
            }
        }

        let merger = RankedListMerger::new(rating);
        let ranking = merger.merge(vec![Item(10), Item(30), Item(20)]).await;

        assert_eq!(ids(&ranking.items), vec![20, 30, 10]);
        assert!(ranking.is_fully_ranked());
    }

    #[tokio::test]
    async fn test_merge_store_unavailable_keeps_input_order() {
        let mut store = MockStore::new();
        store
            .expect_ranked_ids()
            .withf(|collection| *collection == Collection::UserRating)
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let merger = RankedListMerger::new(Arc::new(UserRating::new(Arc::new(store))));
        let ranking = merger.merge(vec![Item(3), Item(1), Item(2)]).await;

        assert_eq!(ids(&ranking.items), vec![3, 1, 2]);
        assert_eq!(ranking.status, RankingStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_merge_does_not_write() {
        let mut store = MockStore::new();
        store
            .expect_ranked_ids()
            .returning(|_| Ok(vec![1]));
        store.expect_increment_score().never();

        let merger = RankedListMerger::new(Arc::new(UserRating::new(Arc::new(store))));
        let ranking = merger.merge(vec![Item(2), Item(1)]).await;

        assert_eq!(ids(&ranking.items), vec![1, 2]);
        assert_eq!(
            ranking.status,
            RankingStatus::PartiallyRanked { missing: vec![2] }
        );
    }
}
