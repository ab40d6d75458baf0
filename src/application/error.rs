//! Orchestrator Error Types
//!
//! Validation failures are raised before any I/O. Adapter and service errors
//! are either propagated unchanged or wrapped with the step being attempted;
//! `ServiceError::kind` looks through the wrapping.

use crate::shared::error::AppError;

/// Error returned by every orchestrator operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("password is required")]
    MissingPassword,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("attachment was not found while deleting")]
    AttachmentNotFound,

    /// Collaborator error propagated unchanged
    #[error(transparent)]
    Store(#[from] AppError),

    /// Collaborator error wrapped with the step being attempted
    #[error("an error occurred while {step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: AppError,
    },

    /// Hashing, verification or token issuance failed to run
    #[error("an error occurred while {step}: {source}")]
    Mechanism {
        step: &'static str,
        #[source]
        source: AppError,
    },

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] AppError),

    #[error("rollback error: {rollback}, original error: {cause}")]
    Rollback {
        rollback: AppError,
        #[source]
        cause: Box<ServiceError>,
    },
}

/// Classification of a [`ServiceError`] for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingPassword,
    InvalidCredentials,
    AttachmentNotFound,
    NotFound,
    DuplicateIdentifier,
    InvalidInput,
    MechanismFailure,
    TransactionFailure,
    Cancelled,
    Unavailable,
}

impl ErrorKind {
    /// Suggested HTTP status for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::MissingPassword | ErrorKind::InvalidInput => 400,
            ErrorKind::InvalidCredentials => 401,
            ErrorKind::AttachmentNotFound | ErrorKind::NotFound => 404,
            ErrorKind::DuplicateIdentifier => 409,
            ErrorKind::Cancelled => 499,
            ErrorKind::MechanismFailure
            | ErrorKind::TransactionFailure
            | ErrorKind::Unavailable => 500,
        }
    }
}

impl ServiceError {
    pub(crate) fn step(step: &'static str) -> impl FnOnce(AppError) -> Self {
        move |source| ServiceError::Step { step, source }
    }

    pub(crate) fn mechanism(step: &'static str) -> impl FnOnce(AppError) -> Self {
        move |source| ServiceError::Mechanism { step, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::MissingPassword => ErrorKind::MissingPassword,
            ServiceError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ServiceError::AttachmentNotFound => ErrorKind::AttachmentNotFound,
            ServiceError::Store(source) | ServiceError::Step { source, .. } => classify(source),
            ServiceError::Mechanism { source, .. } if source.is_cancellation() => {
                ErrorKind::Cancelled
            }
            ServiceError::Mechanism { .. } => ErrorKind::MechanismFailure,
            ServiceError::Commit(_) | ServiceError::Rollback { .. } => {
                ErrorKind::TransactionFailure
            }
        }
    }
}

fn classify(err: &AppError) -> ErrorKind {
    match err {
        AppError::NotFound(_) => ErrorKind::NotFound,
        AppError::Conflict(_) => ErrorKind::DuplicateIdentifier,
        AppError::InvalidInput(_) => ErrorKind::InvalidInput,
        AppError::Cancelled | AppError::DeadlineExceeded => ErrorKind::Cancelled,
        AppError::Internal(_) | AppError::Database(_) | AppError::Storage(_) => {
            ErrorKind::Unavailable
        }
    }
}
