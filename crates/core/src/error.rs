//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The first three variants form the authorization taxonomy. Their messages
/// are part of the public contract and are surfaced to callers verbatim, so
/// `Display` prints the message with no prefix.
///
/// None of these errors is retryable from the core's point of view; retrying
/// transient infrastructure failures belongs to the repository adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A user (or target user) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Authenticated but disallowed.
    #[error("{0}")]
    Forbidden(String),

    /// No authenticated identity was presented.
    #[error("{0}")]
    Unauthenticated(String),

    /// A repository adapter failed (connection loss, poisoned lock, bad row).
    #[error("repository failure: {0}")]
    Repository(String),
}

/// Discriminant of [`DomainError`], for callers that map errors to transport
/// status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Unauthenticated,
    Repository,
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            DomainError::Repository(_) => ErrorKind::Repository,
        }
    }

    /// The bare message, without any prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::NotFound(msg)
            | DomainError::Forbidden(msg)
            | DomainError::Unauthenticated(msg)
            | DomainError::Repository(msg) => msg,
        }
    }
}
