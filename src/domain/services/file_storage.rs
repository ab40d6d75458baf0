//! File storage contract.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Location of a blob written by [`FileStorage::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage-assigned name, unique within the store
    pub name: String,

    /// Full path of the blob
    pub path: String,
}

/// Blob store for attachment contents.
///
/// Writes are not transactional: a stored blob stays until deleted.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write a blob. The assigned name may differ from `requested_name`.
    async fn store(&self, blob: &[u8], requested_name: &str) -> Result<StoredFile, AppError>;

    /// Delete a blob by its storage-assigned name.
    async fn delete(&self, stored_name: &str) -> Result<(), AppError>;
}
