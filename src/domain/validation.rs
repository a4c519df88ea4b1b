//! Request validation. Runs on the calling task before anything is dispatched.

use super::entities::{MAX_RATING, MIN_RATING, NewRating};
use super::errors::DomainError;
use tracing::warn;

/// Check a rating submission. First failing rule wins:
/// `item_id > 0`, then `author_id > 0`, then the value range.
pub fn validate_rating(item_id: i64, author_id: i64, value: i32) -> Result<NewRating, DomainError> {
    validate_item_id(item_id)?;
    if author_id <= 0 {
        return Err(rejected("author_id must be positive"));
    }
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(rejected(format!(
            "rate must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(NewRating::new_unchecked(item_id, author_id, value))
}

/// Check the item id of a summary query.
pub fn validate_item_id(item_id: i64) -> Result<(), DomainError> {
    if item_id <= 0 {
        return Err(rejected("item_id must be positive"));
    }
    Ok(())
}

fn rejected(message: impl Into<String>) -> DomainError {
    let err = DomainError::invalid_argument(message);
    warn!(error = %err, "validation failed");
    err
}
