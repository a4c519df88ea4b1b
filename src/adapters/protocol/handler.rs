//! Protocol adapter. Entry point for the transport layer.
//!
//! Every request ends in exactly one outcome: the [`Responder`] is consumed
//! by value when the outcome is emitted, so it cannot be answered twice, and a
//! responder dropped unanswered is visible to the receiving side.

use super::messages::{
    GetSummaryRequest, GetSummaryResponse, Rate, SubmitRatingRequest, SubmitRatingResponse,
};
use super::status::{Code, Status};
use crate::domain::DomainError;
use crate::usecases::{DispatchHandle, RatingService};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// Sink for the single outcome of one request.
pub trait Responder<T>: Send + 'static {
    fn respond(self, outcome: Result<T, Status>);
}

impl<T: Send + 'static> Responder<T> for oneshot::Sender<Result<T, Status>> {
    fn respond(self, outcome: Result<T, Status>) {
        if self.send(outcome).is_err() {
            debug!("caller went away before the response was ready");
        }
    }
}

pub struct RatingHandler {
    service: Arc<RatingService>,
}

impl RatingHandler {
    pub fn new(service: Arc<RatingService>) -> Self {
        Self { service }
    }

    /// Handle a rating submission. Returns as soon as the work is dispatched.
    pub fn submit_rating<R>(&self, request: SubmitRatingRequest, responder: R)
    where
        R: Responder<SubmitRatingResponse>,
    {
        let value = match Rate::try_from(request.rate).ok().and_then(Rate::value) {
            Some(value) => value,
            None => {
                warn!(
                    item_id = request.item_id,
                    author_id = request.author_id,
                    rate = request.rate,
                    "invalid rate value"
                );
                let err = DomainError::invalid_argument(format!("Invalid rate: {}", request.rate));
                responder.respond(Err(Status::from(err)));
                return;
            }
        };

        match self
            .service
            .submit_rating(request.item_id, request.author_id, value)
        {
            Ok(handle) => forward(handle, responder, "submit_rating", |rating_id| {
                SubmitRatingResponse { rating_id }
            }),
            Err(e) => respond(responder, "submit_rating", Err(Status::from(e))),
        }
    }

    /// Handle a summary query. Returns as soon as the work is dispatched.
    pub fn get_summary<R>(&self, request: GetSummaryRequest, responder: R)
    where
        R: Responder<GetSummaryResponse>,
    {
        match self.service.get_summary(request.item_id) {
            Ok(handle) => forward(handle, responder, "get_summary", GetSummaryResponse::from),
            Err(e) => respond(responder, "get_summary", Err(Status::from(e))),
        }
    }
}

/// Attach a completion callback that answers `responder` once `handle`
/// resolves.
///
/// Domain errors are mapped to a status; an error that already is a
/// [`Status`] passes through unchanged.
pub fn forward<T, U, E, R, F>(
    handle: DispatchHandle<T, E>,
    responder: R,
    method: &'static str,
    to_response: F,
) where
    T: Send + 'static,
    U: Send + 'static,
    E: From<DomainError> + Into<Status> + Send + 'static,
    R: Responder<U>,
    F: FnOnce(T) -> U + Send + 'static,
{
    handle.on_complete(move |outcome| {
        respond(responder, method, outcome.map(to_response).map_err(Into::into));
    });
}

fn respond<U, R: Responder<U>>(responder: R, method: &'static str, outcome: Result<U, Status>) {
    if let Err(status) = &outcome {
        match status.code() {
            Code::Internal => {
                error!(
                    method,
                    error = %status,
                    cause = ?status.domain_cause(),
                    "request failed"
                );
            }
            _ => debug!(method, code = %status.code(), "request rejected"),
        }
    }
    responder.respond(outcome);
}
