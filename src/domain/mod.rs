//! Core domain layer. No external I/O dependencies.
//!
//! Entities, validation and error classification live here. Dependencies flow inward.

pub mod classifier;
pub mod entities;
pub mod errors;
pub mod validation;

pub use classifier::{ErrorKind, Operation, classify, classify_code};
pub use entities::{MAX_RATING, MIN_RATING, NewRating, RatingSummary, RequestContext, method};
pub use errors::{DataAccessError, DomainError, InternalKind};
pub use validation::{validate_item_id, validate_rating};
