/// Error types for rating-service
use crate::store::{Collection, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatingError {
    /// Action name outside the collection's weight table. A caller bug, never retried.
    #[error("Unknown action '{action}' for {collection}")]
    UnknownAction {
        collection: Collection,
        action: String,
    },

    #[error("Score store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl RatingError {
    /// Write-path callers surface retryable errors as a failed, retryable action.
    pub fn is_retryable(&self) -> bool {
        match self {
            RatingError::Store(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for rating operations
pub type RatingResult<T> = Result<T, RatingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = RatingError::UnknownAction {
            collection: Collection::ArticleRating,
            action: "comment".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown action 'comment' for article_rating");

        let err = RatingError::NotFound("user alice".to_string());
        assert_eq!(err.to_string(), "Not found: user alice");
    }

    #[test]
    fn test_retryable_only_for_store_failures() {
        let err: RatingError = StoreError::Timeout(Duration::from_millis(500)).into();
        assert!(err.is_retryable());

        let err = RatingError::UnknownAction {
            collection: Collection::UserRating,
            action: "bogus_action".to_string(),
        };
        assert!(!err.is_retryable());
    }
}
