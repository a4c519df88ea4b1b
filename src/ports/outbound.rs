//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DataAccessError, NewRating, RatingSummary, RequestContext};

/// Persistence gateway for ratings.
///
/// Implementations check out their own connection per call and must not share
/// one connection across concurrent calls. `ctx` is diagnostic only.
#[async_trait::async_trait]
pub trait RatingRepoPort: Send + Sync {
    /// Insert a rating and return its generated id.
    ///
    /// A repeated `(item_id, author_id)` pair must fail with an integrity-class
    /// code (`23...`) and leave nothing behind.
    async fn append_rating(
        &self,
        ctx: &RequestContext,
        rating: &NewRating,
    ) -> Result<i64, DataAccessError>;

    /// Counts for `item_id`, reflecting every rating committed before the call.
    /// Unknown items yield an all-zero summary.
    async fn summarize(
        &self,
        ctx: &RequestContext,
        item_id: i64,
    ) -> Result<RatingSummary, DataAccessError>;
}
