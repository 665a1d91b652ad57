use super::rating::{ArticleAction, ArticleRating, UserAction, UserRating};
use super::view_counter::ViewCounter;
use crate::domain::ArticleStats;
use crate::error::RatingResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// Translates domain actions into rating and view-count updates.
///
/// Write failures are returned to the caller so the triggering action
/// (like, subscribe, comment) fails visibly instead of silently losing a
/// score update. Cleanup after a delete is the exception: the relational
/// delete is authoritative, so a failed clear is only logged.
#[derive(Clone)]
pub struct RatingEvents {
    users: Arc<UserRating>,
    articles: Arc<ArticleRating>,
    views: Arc<ViewCounter>,
}

impl RatingEvents {
    pub fn new(users: Arc<UserRating>, articles: Arc<ArticleRating>, views: Arc<ViewCounter>) -> Self {
        Self {
            users,
            articles,
            views,
        }
    }

    // ========== Subscriptions ==========

    /// `created` is whether the catalog inserted a new subscription row.
    /// Re-subscribing must not add the weight twice.
    pub async fn subscription_added(&self, target_user_id: i64, created: bool) -> RatingResult<()> {
        if !created {
            debug!(target_user_id, "Subscription already exists, rating unchanged");
            return Ok(());
        }
        self.users
            .increment_or_decrement_rating_by_id(UserAction::AddSubscriber, target_user_id)
            .await
    }

    /// `removed` is whether a subscription row was actually deleted.
    pub async fn subscription_removed(&self, target_user_id: i64, removed: bool) -> RatingResult<()> {
        if !removed {
            warn!(target_user_id, "Unsubscribe without existing subscription");
            return Ok(());
        }
        self.users
            .increment_or_decrement_rating_by_id(UserAction::DeleteSubscriber, target_user_id)
            .await
    }

    // ========== Articles ==========

    /// Fired when an article becomes published. Drafts carry no author weight.
    pub async fn article_published(&self, author_id: i64) -> RatingResult<()> {
        self.users
            .increment_or_decrement_rating_by_id(UserAction::CreateArticle, author_id)
            .await
    }

    /// `was_published` gates the author's `DeleteArticle`: a draft never
    /// earned `CreateArticle`, so deleting it leaves the author's rating alone.
    pub async fn article_deleted(
        &self,
        author_id: i64,
        article_id: i64,
        was_published: bool,
    ) -> RatingResult<()> {
        if was_published {
            self.users
                .increment_or_decrement_rating_by_id(UserAction::DeleteArticle, author_id)
                .await?;
        } else {
            debug!(author_id, article_id, "Draft deleted, author rating unchanged");
        }

        if let Err(err) = self.articles.clear_rating_by_id(article_id).await {
            warn!(article_id, error = %err, "Failed to clear rating of deleted article");
        }
        Ok(())
    }

    pub async fn user_deleted(&self, user_id: i64) {
        if let Err(err) = self.users.clear_rating_by_id(user_id).await {
            warn!(user_id, error = %err, "Failed to clear rating of deleted user");
        }
    }

    /// Score the view, then count it. Returns the new view count.
    ///
    /// A failed rating update leaves the counter untouched. A failed counter
    /// update after a successful rating update is returned as an error; a
    /// retry then scores the view twice.
    pub async fn article_viewed(&self, article_id: i64) -> RatingResult<i64> {
        self.articles
            .increment_or_decrement_rating_by_id(ArticleAction::View, article_id)
            .await?;
        self.views.increment_view_count(article_id).await
    }

    pub async fn article_liked(&self, article_id: i64) -> RatingResult<()> {
        self.articles
            .increment_or_decrement_rating_by_id(ArticleAction::Like, article_id)
            .await
    }

    pub async fn article_unliked(&self, article_id: i64) -> RatingResult<()> {
        self.articles
            .increment_or_decrement_rating_by_id(ArticleAction::Unlike, article_id)
            .await
    }

    pub async fn comment_added(&self, article_id: i64) -> RatingResult<()> {
        self.articles
            .increment_or_decrement_rating_by_id(ArticleAction::AddComment, article_id)
            .await
    }

    pub async fn comment_deleted(&self, article_id: i64) -> RatingResult<()> {
        self.articles
            .increment_or_decrement_rating_by_id(ArticleAction::DeleteComment, article_id)
            .await
    }

    // ========== Reads ==========

    pub async fn article_stats(&self, article_id: i64) -> RatingResult<ArticleStats> {
        let rating = self.articles.get_rating_by_id(article_id).await?;
        let view_count = self.views.get_view_count(article_id).await?;
        Ok(ArticleStats {
            article_id,
            rating,
            view_count,
        })
    }

    pub async fn user_rating(&self, user_id: i64) -> RatingResult<i64> {
        self.users.get_rating_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RatingError;
    use crate::store::{
        Collection, CounterStore, MemoryScoreStore, ScoreStore, StoreError, StoreResult,
    };
    use async_trait::async_trait;

    fn events(store: Arc<MemoryScoreStore>) -> RatingEvents {
        RatingEvents::new(
            Arc::new(UserRating::new(store.clone())),
            Arc::new(ArticleRating::new(store.clone())),
            Arc::new(ViewCounter::new(store)),
        )
    }

    /// Serves reads and increments, refuses removals.
    struct NoRemoveStore(MemoryScoreStore);

    #[async_trait]
    impl ScoreStore for NoRemoveStore {
        async fn get_score(&self, collection: Collection, id: i64) -> StoreResult<Option<f64>> {
            self.0.get_score(collection, id).await
        }

        async fn increment_score(
            &self,
            collection: Collection,
            id: i64,
            amount: f64,
        ) -> StoreResult<f64> {
            self.0.increment_score(collection, id, amount).await
        }

        async fn ranked_ids(&self, collection: Collection) -> StoreResult<Vec<i64>> {
            self.0.ranked_ids(collection).await
        }

        async fn remove_member(&self, _collection: Collection, _id: i64) -> StoreResult<()> {
            Err(StoreError::Unavailable("read-only replica".to_string()))
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    /// Refuses every write.
    struct NoIncrementStore;

    #[async_trait]
    impl ScoreStore for NoIncrementStore {
        async fn get_score(&self, _: Collection, _: i64) -> StoreResult<Option<f64>> {
            Ok(None)
        }

        async fn increment_score(&self, _: Collection, _: i64, _: f64) -> StoreResult<f64> {
            Err(StoreError::Timeout(std::time::Duration::from_millis(500)))
        }

        async fn ranked_ids(&self, _: Collection) -> StoreResult<Vec<i64>> {
            Ok(Vec::new())
        }

        async fn remove_member(&self, _: Collection, _: i64) -> StoreResult<()> {
            Ok(())
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_subscription_added_only_when_created() {
        let events = events(Arc::new(MemoryScoreStore::new()));

        events.subscription_added(2, true).await.unwrap();
        events.subscription_added(2, false).await.unwrap();

        assert_eq!(events.user_rating(2).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_subscription_removed() {
        let events = events(Arc::new(MemoryScoreStore::new()));

        events.subscription_added(2, true).await.unwrap();
        events.subscription_removed(2, true).await.unwrap();
        events.subscription_removed(2, false).await.unwrap();

        assert_eq!(events.user_rating(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_article_viewed_updates_counter_and_rating() {
        let store = Arc::new(MemoryScoreStore::new());
        let events = events(store.clone());

        events.article_viewed(5).await.unwrap();
        let views = events.article_viewed(5).await.unwrap();

        assert_eq!(views, 2);
        assert_eq!(
            events.article_stats(5).await.unwrap(),
            ArticleStats {
                article_id: 5,
                rating: 2,
                view_count: 2,
            }
        );
        assert_eq!(store.get_counter("article:5:id").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_engagement_weights() {
        let events = events(Arc::new(MemoryScoreStore::new()));

        events.article_liked(1).await.unwrap();
        events.comment_added(1).await.unwrap();
        events.comment_added(1).await.unwrap();
        events.comment_deleted(1).await.unwrap();
        events.article_unliked(1).await.unwrap();
        events.article_liked(1).await.unwrap();

        assert_eq!(events.article_stats(1).await.unwrap().rating, 8);
    }

    #[tokio::test]
    async fn test_article_deleted_clears_article_and_scores_author() {
        let store = Arc::new(MemoryScoreStore::new());
        let events = events(store.clone());

        events.article_published(1).await.unwrap();
        events.article_published(1).await.unwrap();
        events.article_liked(10).await.unwrap();

        events.article_deleted(1, 10, true).await.unwrap();

        assert_eq!(events.user_rating(1).await.unwrap(), 25);
        assert!(store.is_empty(Collection::ArticleRating));
    }

    #[tokio::test]
    async fn test_delete_cleanup_failure_does_not_block() {
        let inner = MemoryScoreStore::new();
        inner
            .increment_score(Collection::ArticleRating, 10, 3.0)
            .await
            .unwrap();
        let store = Arc::new(NoRemoveStore(inner));
        let counters = Arc::new(MemoryScoreStore::new());
        let events = RatingEvents::new(
            Arc::new(UserRating::new(store.clone())),
            Arc::new(ArticleRating::new(store.clone())),
            Arc::new(ViewCounter::new(counters)),
        );

        events.article_deleted(1, 10, true).await.unwrap();
        events.user_deleted(1).await;

        // Stale entry stays behind
        assert_eq!(
            store.ranked_ids(Collection::ArticleRating).await.unwrap(),
            vec![10]
        );
    }

    #[tokio::test]
    async fn test_draft_deleted_keeps_author_rating() {
        let store = Arc::new(MemoryScoreStore::new());
        let events = events(store.clone());

        events.article_published(1).await.unwrap();
        events.article_liked(99).await.unwrap();

        events.article_deleted(1, 99, false).await.unwrap();

        assert_eq!(events.user_rating(1).await.unwrap(), 25);
        assert!(store.is_empty(Collection::ArticleRating));
    }

    #[tokio::test]
    async fn test_failed_view_rating_is_not_counted() {
        let counters = Arc::new(MemoryScoreStore::new());
        let events = RatingEvents::new(
            Arc::new(UserRating::new(Arc::new(NoIncrementStore))),
            Arc::new(ArticleRating::new(Arc::new(NoIncrementStore))),
            Arc::new(ViewCounter::new(counters.clone())),
        );

        let result = events.article_viewed(5).await;

        assert!(matches!(result, Err(RatingError::Store(_))));
        assert_eq!(counters.get_counter("article:5:id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_deleted_removes_rank_entry() {
        let store = Arc::new(MemoryScoreStore::new());
        let events = events(store.clone());

        events.subscription_added(3, true).await.unwrap();
        events.user_deleted(3).await;

        assert!(store.is_empty(Collection::UserRating));
    }
}
