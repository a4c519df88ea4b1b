//! Domain entities. Pure data structures for the core business.
//!
//! No protocol/storage types here; adapters map into these.

use std::fmt;

/// Lowest accepted rating value.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating value.
pub const MAX_RATING: i32 = 5;

/// Number of distinct rating values (1..=5).
pub const RATING_VALUES: usize = (MAX_RATING - MIN_RATING + 1) as usize;

/// A rating that passed validation and may be handed to the repository.
///
/// Only [`crate::domain::validation::validate_rating`] builds one, so every
/// instance satisfies the identifier and range invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRating {
    item_id: i64,
    author_id: i64,
    value: i32,
}

impl NewRating {
    pub(crate) fn new_unchecked(item_id: i64, author_id: i64, value: i32) -> Self {
        Self {
            item_id,
            author_id,
            value,
        }
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    pub fn author_id(&self) -> i64 {
        self.author_id
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

/// Aggregate counts for one item. The total is derived from the per-value
/// counts, so `total() == sum(count(v))` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    counts: [i64; RATING_VALUES],
}

impl RatingSummary {
    /// Summary with no ratings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from counts ordered by value, `counts[0]` being the count of 1s.
    pub fn from_counts(counts: [i64; RATING_VALUES]) -> Self {
        Self { counts }
    }

    /// Add `count` ratings of `value`. Returns `false` (and changes nothing)
    /// when `value` is outside the rating range.
    pub fn add(&mut self, value: i32, count: i64) -> bool {
        match Self::slot(value) {
            Some(slot) => {
                self.counts[slot] += count;
                true
            }
            None => false,
        }
    }

    /// Count of ratings with the given value; 0 for values outside the range.
    pub fn count(&self, value: i32) -> i64 {
        Self::slot(value).map_or(0, |slot| self.counts[slot])
    }

    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }

    pub fn counts(&self) -> [i64; RATING_VALUES] {
        self.counts
    }

    fn slot(value: i32) -> Option<usize> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Some((value - MIN_RATING) as usize)
        } else {
            None
        }
    }
}

/// Method names carried in [`RequestContext`].
pub mod method {
    pub const SUBMIT_RATING: &str = "submit_rating";
    pub const GET_SUMMARY: &str = "get_summary";
}

/// Diagnostic metadata for one request. Snapshotted by value when work is
/// dispatched; never read for control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: &'static str,
    pub item_id: i64,
    pub author_id: Option<i64>,
    pub rate: Option<i32>,
}

impl RequestContext {
    pub fn submit_rating(item_id: i64, author_id: i64, rate: i32) -> Self {
        Self {
            method: method::SUBMIT_RATING,
            item_id,
            author_id: Some(author_id),
            rate: Some(rate),
        }
    }

    pub fn get_summary(item_id: i64) -> Self {
        Self {
            method: method::GET_SUMMARY,
            item_id,
            author_id: None,
            rate: None,
        }
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} item_id={}", self.method, self.item_id)?;
        if let Some(author_id) = self.author_id {
            write!(f, " author_id={author_id}")?;
        }
        if let Some(rate) = self.rate {
            write!(f, " rate={rate}")?;
        }
        Ok(())
    }
}
