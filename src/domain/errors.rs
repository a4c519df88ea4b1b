//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure failures into [`DataAccessError`]; the
//! classifier turns those into [`DomainError`].

use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raw failure reported by a repository adapter.
///
/// `code` is a SQLSTATE-style code (`23505`, `08006`, ...) when the adapter
/// could determine one.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DataAccessError {
    code: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl DataAccessError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_owned),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What went wrong inside the service, as opposed to what the caller got wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalKind {
    /// Unclassified storage failure.
    Database,
    /// Storage rejected the statement (syntax/access class) on the read path.
    Query,
    /// Generated identifier does not fit the protocol's 32-bit field.
    IdentifierOverflow,
    /// Unit of work panicked or was aborted.
    Worker,
    /// Transport-side I/O.
    Io,
}

impl fmt::Display for InternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InternalKind::Database => "database",
            InternalKind::Query => "query",
            InternalKind::IdentifierOverflow => "identifier_overflow",
            InternalKind::Worker => "worker",
            InternalKind::Io => "io",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    InvalidArgument(String),

    /// Uniqueness violation; the caller already rated this item.
    #[error("{message}")]
    Conflict {
        message: String,
        #[source]
        source: DataAccessError,
    },

    /// Transient connectivity failure.
    #[error("{message}")]
    Unavailable {
        message: String,
        #[source]
        source: DataAccessError,
    },

    #[error("{message}")]
    Internal {
        kind: InternalKind,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl DomainError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DomainError::InvalidArgument(message.into())
    }

    pub fn internal(kind: InternalKind, message: impl Into<String>) -> Self {
        DomainError::Internal {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with_source(
        kind: InternalKind,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        DomainError::Internal {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Short name of the variant, for log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainError::InvalidArgument(_) => "invalid_argument",
            DomainError::Conflict { .. } => "conflict",
            DomainError::Unavailable { .. } => "unavailable",
            DomainError::Internal { .. } => "internal",
        }
    }

    /// The raw repository failure this error was classified from, if any.
    pub fn data_access_cause(&self) -> Option<&DataAccessError> {
        match self {
            DomainError::Conflict { source, .. } | DomainError::Unavailable { source, .. } => {
                Some(source)
            }
            DomainError::Internal {
                source: Some(source),
                ..
            } => source.downcast_ref::<DataAccessError>(),
            _ => None,
        }
    }
}
