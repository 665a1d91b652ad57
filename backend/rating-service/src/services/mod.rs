pub mod events;
pub mod listing;
pub mod ranked_list;
pub mod rating;
pub mod view_counter;

pub use events::RatingEvents;
pub use listing::{ArticleListing, Catalog, Listing, UserListing};
pub use ranked_list::{order_by_rank, Ranked, RankedListMerger, Ranking, RankingStatus};
pub use rating::{
    ArticleAction, ArticleRating, RatingAction, RatingEngine, UserAction, UserRating,
};
pub use view_counter::ViewCounter;
