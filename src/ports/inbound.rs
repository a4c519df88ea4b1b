//! Inbound port. A driving adapter (transport) calls into the application.

use crate::domain::DomainError;

/// Input port: a transport feeds requests to the protocol handler until its
/// input ends.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    async fn run(&self) -> Result<(), DomainError>;
}
