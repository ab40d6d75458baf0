//! # Domain Services
//!
//! Contracts for the stateless collaborators the orchestrator composes with
//! the store adapters.
//!
//! - **FileStorage**: Blob store for attachment contents (non-transactional)
//! - **CredentialService**: Password hashing, verification and token issuance

mod credential_service;
mod file_storage;

pub use credential_service::CredentialService;
pub use file_storage::{FileStorage, StoredFile};
