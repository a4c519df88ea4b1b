//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatcher;
pub mod rating_service;

pub use dispatcher::{AsyncDispatcher, DispatchHandle};
pub use rating_service::RatingService;
