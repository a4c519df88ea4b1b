//! Cross-cutting concerns: configuration and logging bootstrap.

pub mod config;
pub mod logging;
