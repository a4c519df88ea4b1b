//! Storage failure classification.
//!
//! [`classify_code`] is a pure mapping from a SQLSTATE-style code to an error
//! kind; [`classify`] wraps a raw [`DataAccessError`] into the matching
//! [`DomainError`] and keeps it as the source.

use super::errors::{DataAccessError, DomainError, InternalKind};

/// Which repository call failed. The read path tags syntax/access failures
/// as query errors; the write path does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AppendRating,
    Summarize,
}

impl Operation {
    fn describe(self) -> &'static str {
        match self {
            Operation::AppendRating => "adding rating",
            Operation::Summarize => "retrieving ratings",
        }
    }
}

/// Result of classifying an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Unavailable,
    Internal(InternalKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeClass {
    Integrity,
    Connection,
    SyntaxOrAccess,
}

/// Known prefixes. Longest match wins, so specific codes can refine a class.
const CODE_CLASSES: &[(&str, CodeClass)] = &[
    ("23", CodeClass::Integrity),
    ("08", CodeClass::Connection),
    // too_many_connections, admin/crash shutdown, cannot_connect_now
    ("53300", CodeClass::Connection),
    ("57P01", CodeClass::Connection),
    ("57P02", CodeClass::Connection),
    ("57P03", CodeClass::Connection),
    ("42", CodeClass::SyntaxOrAccess),
];

fn code_class(code: &str) -> Option<CodeClass> {
    CODE_CLASSES
        .iter()
        .filter(|(prefix, _)| code.starts_with(*prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|&(_, class)| class)
}

/// Map an error code to a kind. Total: every input yields exactly one kind.
pub fn classify_code(code: Option<&str>, operation: Operation) -> ErrorKind {
    match (code.and_then(code_class), operation) {
        (Some(CodeClass::Integrity), _) => ErrorKind::Conflict,
        (Some(CodeClass::Connection), _) => ErrorKind::Unavailable,
        (Some(CodeClass::SyntaxOrAccess), Operation::Summarize) => {
            ErrorKind::Internal(InternalKind::Query)
        }
        _ => ErrorKind::Internal(InternalKind::Database),
    }
}

/// Wrap a repository failure. The raw error stays reachable as `source`.
pub fn classify(operation: Operation, err: DataAccessError) -> DomainError {
    let what = operation.describe();
    match classify_code(err.code(), operation) {
        ErrorKind::Conflict => DomainError::Conflict {
            message: format!("Database constraint violation while {what}: {err}"),
            source: err,
        },
        ErrorKind::Unavailable => DomainError::Unavailable {
            message: format!("Database connection error while {what}: {err}"),
            source: err,
        },
        ErrorKind::Internal(kind) => {
            let message = match kind {
                InternalKind::Query => format!("Database query error while {what}: {err}"),
                _ => format!("Database error occurred while {what}: {err}"),
            };
            DomainError::internal_with_source(kind, message, err)
        }
    }
}
