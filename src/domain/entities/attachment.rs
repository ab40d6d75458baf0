//! Attachment entity and repository trait.
//!
//! Maps to the `attachment` table in the database schema. The row points at a
//! blob owned by the file storage service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::transaction::Transaction;
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Maximum file size in bytes (25MB).
pub const MAX_ATTACHMENT_SIZE: i64 = 26_214_400;

/// A file uploaded by a user.
///
/// Maps to the `attachment` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user_id: BIGINT NOT NULL REFERENCES auth(id)
/// - file_name: TEXT NOT NULL (storage-assigned name)
/// - file_path: TEXT NOT NULL
/// - file_size: BIGINT NULL
/// - mime_type: VARCHAR(100) NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Store-assigned ID (0 until persisted)
    #[serde(default)]
    pub id: i64,

    /// Uploading user
    pub user_id: i64,

    /// Display name on the way in, storage-assigned name once stored
    pub file_name: String,

    /// Location of the blob inside file storage
    #[serde(default, skip_serializing)]
    pub file_path: String,

    /// File size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,

    /// MIME type (e.g., "image/png")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Set by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Attachment {
    /// Upload input for `user_id` with the caller-supplied display name.
    pub fn upload(user_id: i64, file_name: impl Into<String>) -> Self {
        Self {
            user_id,
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Attachment store adapter.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Transaction handle returned by [`AttachmentRepository::delete_scoped`].
    type Tx: Transaction;

    /// Insert an attachment row.
    async fn insert(
        &self,
        ctx: &RequestContext,
        attachment: &Attachment,
    ) -> Result<Attachment, AppError>;

    /// Begin a transaction and delete the row matching (file_id, user_id).
    ///
    /// Returns the still-open transaction and the stored file name of the
    /// deleted row. An empty name means no row matched.
    async fn delete_scoped(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(Self::Tx, String), AppError>;
}
