//! Rating and ranking engine for the blogging backend
//!
//! Users and articles collect weighted scores in Redis sorted sets as domain
//! events happen (subscriptions, new articles, views, likes, comments).
//! Listings fetched from the relational store are then reordered to match
//! the global rank order, degrading to an unsorted or secondary ordering
//! when rank data is missing.

pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;
pub mod workers;

pub use config::Config;
pub use error::{RatingError, RatingResult};
pub use services::{
    ArticleListing, ArticleRating, Catalog, RankedListMerger, RatingEvents, UserListing,
    UserRating, ViewCounter,
};
pub use store::{Collection, CounterStore, MemoryScoreStore, RedisScoreStore, ScoreStore};

use std::sync::Arc;

/// Rating services wired to one store
#[derive(Clone)]
pub struct RatingServices {
    pub user_rating: Arc<UserRating>,
    pub article_rating: Arc<ArticleRating>,
    pub view_counter: Arc<ViewCounter>,
    pub events: RatingEvents,
}

impl RatingServices {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: ScoreStore + CounterStore + 'static,
    {
        let user_rating = Arc::new(UserRating::new(store.clone()));
        let article_rating = Arc::new(ArticleRating::new(store.clone()));
        let view_counter = Arc::new(ViewCounter::new(store));
        let events = RatingEvents::new(
            user_rating.clone(),
            article_rating.clone(),
            view_counter.clone(),
        );

        Self {
            user_rating,
            article_rating,
            view_counter,
            events,
        }
    }

    pub fn user_listing(&self, catalog: Arc<dyn Catalog>) -> UserListing {
        UserListing::new(catalog, RankedListMerger::new(self.user_rating.clone()))
    }

    pub fn article_listing(&self, catalog: Arc<dyn Catalog>) -> ArticleListing {
        ArticleListing::new(catalog, RankedListMerger::new(self.article_rating.clone()))
    }
}
