//! Rating endpoint protocol: messages, status codes and the request handler.

pub mod handler;
pub mod messages;
pub mod status;

pub use handler::{RatingHandler, Responder, forward};
pub use messages::{
    GetSummaryRequest, GetSummaryResponse, Rate, SubmitRatingRequest, SubmitRatingResponse,
};
pub use status::{Code, Status};
