//! Protocol-level failure: a status code, a client-facing message and the
//! underlying cause for diagnostics.

use crate::domain::DomainError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    InvalidArgument,
    FailedPrecondition,
    Unavailable,
    Internal,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Unavailable => "UNAVAILABLE",
            Code::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct Status {
    code: Code,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The domain error this status was built from, if any.
    pub fn domain_cause(&self) -> Option<&DomainError> {
        self.source.as_ref()?.downcast_ref::<DomainError>()
    }
}

/// `InvalidArgument → INVALID_ARGUMENT`, `Conflict → FAILED_PRECONDITION`,
/// `Unavailable → UNAVAILABLE`, `Internal → INTERNAL`.
///
/// Storage details stay in the source chain; the client sees a fixed message
/// for everything except argument errors.
impl From<DomainError> for Status {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::InvalidArgument(m) => {
                Status::invalid_argument(format!("Invalid request parameters: {m}"))
            }
            DomainError::Conflict { .. } => Status::new(
                Code::FailedPrecondition,
                "Rating already exists for this item and author",
            ),
            DomainError::Unavailable { .. } => {
                Status::new(Code::Unavailable, "Storage temporarily unavailable")
            }
            DomainError::Internal { .. } => {
                Status::internal("Unexpected error occurred while processing request")
            }
        };
        status.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataAccessError, InternalKind};

    #[test]
    fn domain_errors_map_to_codes() {
        let cases = [
            (DomainError::invalid_argument("bad"), Code::InvalidArgument),
            (
                DomainError::Conflict {
                    message: "dup".into(),
                    source: DataAccessError::new(Some("23505"), "dup"),
                },
                Code::FailedPrecondition,
            ),
            (
                DomainError::Unavailable {
                    message: "down".into(),
                    source: DataAccessError::new(Some("08006"), "down"),
                },
                Code::Unavailable,
            ),
            (
                DomainError::internal(InternalKind::IdentifierOverflow, "too big"),
                Code::Internal,
            ),
        ];
        for (err, code) in cases {
            let status = Status::from(err);
            assert_eq!(status.code(), code);
            assert!(status.domain_cause().is_some());
        }
    }

    #[test]
    fn internal_message_hides_details() {
        let status = Status::from(DomainError::internal(InternalKind::Database, "secret table"));
        assert!(!status.message().contains("secret"));
        assert_eq!(
            status.domain_cause().map(ToString::to_string).as_deref(),
            Some("secret table")
        );
    }

    #[test]
    fn storage_failures_do_not_leak_driver_text() {
        let driver = "UNIQUE constraint failed: rates.item_id, rates.author_id";
        let conflict = Status::from(DomainError::Conflict {
            message: format!("Database constraint violation while adding rating: {driver}"),
            source: DataAccessError::new(Some("23505"), driver),
        });
        assert_eq!(conflict.message(), "Rating already exists for this item and author");
        assert!(!conflict.to_string().contains("rates."));

        let unavailable = Status::from(DomainError::Unavailable {
            message: "Database connection error while retrieving ratings: database is locked"
                .into(),
            source: DataAccessError::new(Some("08006"), "database is locked"),
        });
        assert_eq!(unavailable.message(), "Storage temporarily unavailable");
        let cause = unavailable
            .domain_cause()
            .and_then(DomainError::data_access_cause);
        assert_eq!(cause.map(DataAccessError::message), Some("database is locked"));
    }

    #[test]
    fn code_serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Code::FailedPrecondition).unwrap(),
            "\"FAILED_PRECONDITION\""
        );
        assert_eq!(Code::Unavailable.to_string(), "UNAVAILABLE");
    }
}
