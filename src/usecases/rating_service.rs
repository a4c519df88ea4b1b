//! Rating use cases: validate on the caller, persist on the worker pool.
//!
//! - Validation runs inline; invalid requests never take a pool slot
//! - Repository failures are classified where they are caught
//! - Generated ids are narrowed to the protocol's 32-bit field, never truncated

use crate::domain::{
    DomainError, InternalKind, Operation, RatingSummary, RequestContext, classify,
    validate_item_id, validate_rating,
};
use crate::ports::RatingRepoPort;
use crate::usecases::dispatcher::{AsyncDispatcher, DispatchHandle};
use std::sync::Arc;
use tracing::{debug, error};

/// Rating service. Builds units of work and hands them to the dispatcher.
pub struct RatingService {
    repo: Arc<dyn RatingRepoPort>,
    dispatcher: AsyncDispatcher,
}

impl RatingService {
    pub fn new(repo: Arc<dyn RatingRepoPort>, dispatcher: AsyncDispatcher) -> Self {
        Self { repo, dispatcher }
    }

    /// Submit a rating. Returns `Err` right away for invalid input; otherwise a
    /// handle resolving to the new rating id.
    pub fn submit_rating(
        &self,
        item_id: i64,
        author_id: i64,
        value: i32,
    ) -> Result<DispatchHandle<i32>, DomainError> {
        let rating = validate_rating(item_id, author_id, value)?;
        let repo = Arc::clone(&self.repo);
        let ctx = RequestContext::submit_rating(item_id, author_id, value);

        Ok(self.dispatcher.run_async(ctx, move |ctx| async move {
            let generated = repo.append_rating(&ctx, &rating).await.map_err(|e| {
                let err = classify(Operation::AppendRating, e);
                error!(
                    item_id,
                    author_id,
                    rate = value,
                    kind = err.kind_name(),
                    error = %err,
                    "failed to add rating"
                );
                err
            })?;
            let rating_id = narrow_rating_id(generated)?;
            debug!(rating_id, "rating stored");
            Ok::<_, DomainError>(rating_id)
        }))
    }

    /// Aggregate counts for an item. Returns `Err` right away for a
    /// non-positive id.
    pub fn get_summary(
        &self,
        item_id: i64,
    ) -> Result<DispatchHandle<RatingSummary>, DomainError> {
        validate_item_id(item_id)?;
        let repo = Arc::clone(&self.repo);
        let ctx = RequestContext::get_summary(item_id);

        Ok(self.dispatcher.run_async(ctx, move |ctx| async move {
            let summary = repo.summarize(&ctx, item_id).await.map_err(|e| {
                let err = classify(Operation::Summarize, e);
                error!(item_id, kind = err.kind_name(), error = %err, "failed to get ratings");
                err
            })?;
            debug!(total = summary.total(), "ratings summarized");
            Ok::<_, DomainError>(summary)
        }))
    }
}

/// Narrow a generated id to the protocol's `i32` rating id.
pub fn narrow_rating_id(generated: i64) -> Result<i32, DomainError> {
    i32::try_from(generated).map_err(|e| {
        error!(generated, "generated rating id exceeds 32-bit range");
        DomainError::internal_with_source(
            InternalKind::IdentifierOverflow,
            format!("Rating identifier {generated} exceeds 32-bit range"),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_keeps_in_range_ids() {
        assert_eq!(narrow_rating_id(42).unwrap(), 42);
        assert_eq!(narrow_rating_id(i32::MAX as i64).unwrap(), i32::MAX);
    }

    #[test]
    fn narrow_rejects_overflow() {
        let err = narrow_rating_id(i32::MAX as i64 + 1).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Internal {
                kind: InternalKind::IdentifierOverflow,
                source: Some(_),
                ..
            }
        ));
    }
}
