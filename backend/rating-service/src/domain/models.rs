use crate::error::RatingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User row as returned by the catalog for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub article_count: i64,
}

/// Published (or draft) article row as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Rating and view count shown on an article page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStats {
    pub article_id: i64,
    pub rating: i64,
    pub view_count: i64,
}

/// Which users a listing is drawn from, relative to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserFilter {
    /// Everyone except the viewer
    #[default]
    All,
    /// Users the viewer is subscribed to
    Subscriptions,
    /// Users subscribed to the viewer
    Subscribers,
}

/// Which articles a listing is drawn from, relative to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleFilter {
    /// Published articles not written by the viewer
    #[default]
    All,
    /// Published articles by authors the viewer is subscribed to
    Subscriptions,
    /// The viewer's own published articles
    Publish,
    /// The viewer's own drafts
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserOrder {
    #[default]
    Rating,
    ArticleCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleOrder {
    #[default]
    Rating,
    Date,
}

impl FromStr for UserFilter {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(UserFilter::All),
            "subscriptions" => Ok(UserFilter::Subscriptions),
            "subscribers" => Ok(UserFilter::Subscribers),
            other => Err(RatingError::InvalidInput(format!(
                "unknown user filter: {}",
                other
            ))),
        }
    }
}

impl FromStr for ArticleFilter {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ArticleFilter::All),
            "subscriptions" => Ok(ArticleFilter::Subscriptions),
            "publish" => Ok(ArticleFilter::Publish),
            "draft" => Ok(ArticleFilter::Draft),
            other => Err(RatingError::InvalidInput(format!(
                "unknown article filter: {}",
                other
            ))),
        }
    }
}

impl FromStr for UserOrder {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(UserOrder::Rating),
            "article_count" => Ok(UserOrder::ArticleCount),
            other => Err(RatingError::InvalidInput(format!(
                "unknown user order: {}",
                other
            ))),
        }
    }
}

impl FromStr for ArticleOrder {
    type Err = std::convert::Infallible;

    /// Anything other than `rating` orders by date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "rating" => ArticleOrder::Rating,
            _ => ArticleOrder::Date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        assert_eq!("subscribers".parse::<UserFilter>().unwrap(), UserFilter::Subscribers);
        assert_eq!("draft".parse::<ArticleFilter>().unwrap(), ArticleFilter::Draft);
        assert!(matches!(
            "drafts".parse::<ArticleFilter>(),
            Err(RatingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_orders() {
        assert_eq!("article_count".parse::<UserOrder>().unwrap(), UserOrder::ArticleCount);
        assert!("date".parse::<UserOrder>().is_err());

        assert_eq!("rating".parse::<ArticleOrder>().unwrap(), ArticleOrder::Rating);
        assert_eq!("date".parse::<ArticleOrder>().unwrap(), ArticleOrder::Date);
        assert_eq!("popular".parse::<ArticleOrder>().unwrap(), ArticleOrder::Date);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(UserFilter::default(), UserFilter::All);
        assert_eq!(ArticleOrder::default(), ArticleOrder::Rating);
    }
}
