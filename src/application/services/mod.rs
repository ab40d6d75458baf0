//! Application Services
//!
//! Services that compose store adapters, file storage and the credential
//! service into application-level operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Login, registration and access-token refresh
//! - **AttachmentService**: Attachment upload and removal across database and file storage
//! - **GuildService**: Atomic guild provisioning and joined-guild aggregation

pub mod attachment_service;
pub mod auth_service;
pub mod guild_service;

use tracing::error;

use crate::application::error::ServiceError;
use crate::domain::Transaction;

// Re-export service types
pub use attachment_service::{AttachmentService, AttachmentServiceImpl};
pub use auth_service::{AuthService, AuthServiceImpl};
pub use guild_service::{GuildService, GuildServiceImpl};

/// Roll back `tx` after `cause`, reporting both errors if the rollback fails.
pub(crate) async fn rollback_after<T: Transaction>(tx: T, cause: ServiceError) -> ServiceError {
    match tx.rollback().await {
        Ok(()) => cause,
        Err(rollback) => {
            error!(error = %rollback, cause = %cause, "Transaction rollback failed");
            ServiceError::Rollback {
                rollback,
                cause: Box::new(cause),
            }
        }
    }
}
