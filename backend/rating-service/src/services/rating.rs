use crate::error::{RatingError, RatingResult};
use crate::store::{Collection, ScoreStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// A named domain event carrying a fixed signed weight within one collection.
pub trait RatingAction: Copy + fmt::Debug + Send + Sync + 'static {
    /// Collection the actions are scored into
    const COLLECTION: Collection;

    /// Zero-weight action used to materialize a member on first read
    const INIT: Self;

    fn weight(self) -> i64;

    /// Wire name (case-sensitive)
    fn name(self) -> &'static str;

    fn all() -> &'static [Self];

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|action| action.name() == name)
    }
}

/// Actions scored into `user_rating`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Init,
    AddSubscriber,
    DeleteSubscriber,
    CreateArticle,
    DeleteArticle,
}

impl RatingAction for UserAction {
    const COLLECTION: Collection = Collection::UserRating;
    const INIT: Self = UserAction::Init;

    fn weight(self) -> i64 {
        match self {
            UserAction::Init => 0,
            UserAction::AddSubscriber => 10,
            UserAction::DeleteSubscriber => -10,
            UserAction::CreateArticle => 25,
            UserAction::DeleteArticle => -25,
        }
    }

    fn name(self) -> &'static str {
        match self {
            UserAction::Init => "init",
            UserAction::AddSubscriber => "add_subscriber",
            UserAction::DeleteSubscriber => "delete_subscriber",
            UserAction::CreateArticle => "create_article",
            UserAction::DeleteArticle => "delete_article",
        }
    }

    fn all() -> &'static [Self] {
        &[
            UserAction::Init,
            UserAction::AddSubscriber,
            UserAction::DeleteSubscriber,
            UserAction::CreateArticle,
            UserAction::DeleteArticle,
        ]
    }
}

/// Actions scored into `article_rating`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleAction {
    Init,
    View,
    Like,
    Unlike,
    AddComment,
    DeleteComment,
}

impl RatingAction for ArticleAction {
    const COLLECTION: Collection = Collection::ArticleRating;
    const INIT: Self = ArticleAction::Init;

    fn weight(self) -> i64 {
        match self {
            ArticleAction::Init => 0,
            ArticleAction::View => 1,
            ArticleAction::Like => 3,
            ArticleAction::Unlike => -3,
            ArticleAction::AddComment => 5,
            ArticleAction::DeleteComment => -5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ArticleAction::Init => "init",
            ArticleAction::View => "view",
            ArticleAction::Like => "like",
            ArticleAction::Unlike => "unlike",
            ArticleAction::AddComment => "add_comment",
            ArticleAction::DeleteComment => "delete_comment",
        }
    }

    fn all() -> &'static [Self] {
        &[
            ArticleAction::Init,
            ArticleAction::View,
            ArticleAction::Like,
            ArticleAction::Unlike,
            ArticleAction::AddComment,
            ArticleAction::DeleteComment,
        ]
    }
}

macro_rules! impl_action_traits {
    ($action:ty) => {
        impl fmt::Display for $action {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $action {
            type Err = RatingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$action>::from_name(s).ok_or_else(|| RatingError::UnknownAction {
                    collection: <$action as RatingAction>::COLLECTION,
                    action: s.to_string(),
                })
            }
        }
    };
}

impl_action_traits!(UserAction);
impl_action_traits!(ArticleAction);

/// Weighted-event scorer for one collection.
///
/// Scores only move through actions; the stored value is always the sum of
/// the weights applied to the member.
pub struct RatingEngine<A: RatingAction> {
    store: Arc<dyn ScoreStore>,
    _action: PhantomData<fn() -> A>,
}

pub type UserRating = RatingEngine<UserAction>;
pub type ArticleRating = RatingEngine<ArticleAction>;

impl<A: RatingAction> Clone for RatingEngine<A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _action: PhantomData,
        }
    }
}

impl<A: RatingAction> RatingEngine<A> {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self {
            store,
            _action: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        A::COLLECTION
    }

    /// Current rating. A member that was never scored is materialized at 0
    /// so it takes part in later rank orders.
    pub async fn get_rating_by_id(&self, id: i64) -> RatingResult<i64> {
        match self.store.get_score(A::COLLECTION, id).await? {
            Some(score) => Ok(score as i64),
            None => {
                debug!(collection = %A::COLLECTION, id, "Initializing missing rating");
                self.increment_or_decrement_rating_by_id(A::INIT, id).await?;
                Ok(0)
            }
        }
    }

    /// Every scored id in the collection, highest rating first.
    pub async fn get_range_list_by_rating(&self) -> RatingResult<Vec<i64>> {
        Ok(self.store.ranked_ids(A::COLLECTION).await?)
    }

    pub async fn increment_or_decrement_rating_by_id(&self, action: A, id: i64) -> RatingResult<()> {
        let score = self
            .store
            .increment_score(A::COLLECTION, id, action.weight() as f64)
            .await?;

        debug!(
            collection = %A::COLLECTION,
            id,
            action = action.name(),
            weight = action.weight(),
            score,
            "Rating changed"
        );
        Ok(())
    }

    /// Boundary for callers holding a raw action name. Unknown names fail
    /// before the store is touched.
    pub async fn increment_or_decrement_by_name(&self, action: &str, id: i64) -> RatingResult<()> {
        let Some(parsed) = A::from_name(action) else {
            error!(collection = %A::COLLECTION, action, id, "Rating action does not exist");
            return Err(RatingError::UnknownAction {
                collection: A::COLLECTION,
                action: action.to_string(),
            });
        };
        self.increment_or_decrement_rating_by_id(parsed, id).await
    }

    /// Drop the member. Called when the owning user or article is deleted.
    pub async fn clear_rating_by_id(&self, id: i64) -> RatingResult<()> {
        self.store.remove_member(A::COLLECTION, id).await?;
        debug!(collection = %A::COLLECTION, id, "Rating cleared");
        Ok(())
    }
}
