//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::models::report_request::{ReportStatus, ReportTransition};

/// Boxed source error carried by [`DomainError::Storage`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using the domain error type.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors produced by the report request core.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No report request is stored under the given identifier.
    #[error("Report request not found: {0}")]
    NotFound(Uuid),

    /// The backing store could not complete the operation.
    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),

    /// An update was attempted against a stale copy of the aggregate.
    #[error(
        "Concurrency conflict on report request {id}: stored state no longer matches version {expected_version}"
    )]
    ConcurrencyConflict { id: Uuid, expected_version: i32 },

    /// Input failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A lifecycle method was called from a status that does not allow it.
    #[error("Invalid transition for report request {id}: cannot {operation} from status '{from}'")]
    InvalidTransition {
        id: Uuid,
        from: ReportStatus,
        operation: ReportTransition,
    },
}

/// Coarse classification of a [`DomainError`], used for boundary mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Storage,
    ConcurrencyConflict,
    InvalidArgument,
    InvalidTransition,
}

impl DomainError {
    /// Wrap a backing-store failure.
    pub fn storage(err: impl Into<BoxError>) -> Self {
        DomainError::Storage(err.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Storage(_) => ErrorKind::Storage,
            DomainError::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            DomainError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DomainError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        }
    }
}
