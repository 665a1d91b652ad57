//! Filtered and ordered user/article listings
//!
//! Filtering is the catalog's job (the relational store). Ordering by rating
//! goes through [`RankedListMerger`]; the secondary orderings never touch the
//! rating store.

use super::ranked_list::{RankedListMerger, RankingStatus};
use super::rating::{ArticleAction, UserAction};
use crate::domain::{
    ArticleFilter, ArticleOrder, ArticleSummary, UserFilter, UserOrder, UserSummary,
};
use crate::error::RatingResult;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::debug;

/// Relational-store collaborator resolving listing filters.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Users visible to `viewer` under `filter`. `Subscriptions` and
    /// `Subscribers` fail with `NotFound` for an unknown viewer.
    async fn find_users(&self, viewer: &str, filter: UserFilter) -> RatingResult<Vec<UserSummary>>;

    /// Articles in `category` (all categories when `None`) under `filter`.
    /// Without a viewer the filter is ignored and all published articles are returned.
    async fn find_articles(
        &self,
        viewer: Option<&str>,
        category: Option<&str>,
        filter: ArticleFilter,
    ) -> RatingResult<Vec<ArticleSummary>>;
}

/// Ordered listing returned to the caller
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Set when rating order was requested; `None` for secondary orderings
    pub ranking: Option<RankingStatus>,
}

fn by_article_count(users: &mut [UserSummary]) {
    users.sort_by_key(|user| Reverse(user.article_count));
}

fn by_date(articles: &mut [ArticleSummary]) {
    articles.sort_by_key(|article| Reverse(article.published_at));
}

#[derive(Clone)]
pub struct UserListing {
    catalog: Arc<dyn Catalog>,
    merger: RankedListMerger<UserAction>,
}

impl UserListing {
    pub fn new(catalog: Arc<dyn Catalog>, merger: RankedListMerger<UserAction>) -> Self {
        Self { catalog, merger }
    }

    pub async fn list(
        &self,
        viewer: &str,
        filter: UserFilter,
        order: UserOrder,
    ) -> RatingResult<Listing<UserSummary>> {
        let mut users = self.catalog.find_users(viewer, filter).await?;
        debug!(viewer, ?filter, ?order, user_count = users.len(), "Listing users");

        match order {
            UserOrder::ArticleCount => {
                by_article_count(&mut users);
                Ok(Listing {
                    items: users,
                    ranking: None,
                })
            }
            UserOrder::Rating => {
                let mut ranking = self.merger.merge(users).await;
                if ranking.status == RankingStatus::Unavailable {
                    by_article_count(&mut ranking.items);
                }
                Ok(Listing {
                    items: ranking.items,
                    ranking: Some(ranking.status),
                })
            }
        }
    }
}

#[derive(Clone)]
pub struct ArticleListing {
    catalog: Arc<dyn Catalog>,
    merger: RankedListMerger<ArticleAction>,
}

impl ArticleListing {
    pub fn new(catalog: Arc<dyn Catalog>, merger: RankedListMerger<ArticleAction>) -> Self {
        Self { catalog, merger }
    }

    pub async fn list(
        &self,
        viewer: Option<&str>,
        category: Option<&str>,
        filter: ArticleFilter,
        order: ArticleOrder,
    ) -> RatingResult<Listing<ArticleSummary>> {
        let mut articles = self.catalog.find_articles(viewer, category, filter).await?;
        debug!(
            viewer,
            category,
            ?filter,
            ?order,
            article_count = articles.len(),
            "Listing articles"
        );

        match order {
            ArticleOrder::Date => {
                by_date(&mut articles);
                Ok(Listing {
                    items: articles,
                    ranking: None,
                })
            }
            ArticleOrder::Rating => {
                let mut ranking = self.merger.merge(articles).await;
                if ranking.status == RankingStatus::Unavailable {
                    by_date(&mut ranking.items);
                }
                Ok(Listing {
                    items: ranking.items,
                    ranking: Some(ranking.status),
                })
            }
        }
    }
}
