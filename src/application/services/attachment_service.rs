//! Attachment Service
//!
//! Keeps attachment rows and their blobs in step. The two stores share no
//! transaction, so each operation orders its steps to prefer an invisible
//! orphaned blob over a user-visible row without a file:
//!
//! - create: store blob, then insert row (blob discarded if the insert
//!   definitely failed)
//! - delete: delete row inside a transaction, delete blob, then commit; a blob
//!   that is already gone does not block the row delete

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::application::error::ServiceError;
use crate::application::services::rollback_after;
use crate::domain::{Attachment, AttachmentRepository, FileStorage, Transaction};
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Attachment service trait
#[async_trait]
pub trait AttachmentService: Send + Sync {
    /// Store the blob and persist its attachment row.
    ///
    /// The persisted attachment carries the storage-assigned file name.
    async fn create_attachment(
        &self,
        ctx: &RequestContext,
        blob: &[u8],
        attachment: Attachment,
    ) -> Result<Attachment, ServiceError>;

    /// Remove an attachment owned by `user_id`, row and blob.
    async fn delete_attachment(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(), ServiceError>;
}

/// AttachmentService implementation
pub struct AttachmentServiceImpl<R, F>
where
    R: AttachmentRepository,
    F: FileStorage,
{
    attachment_repo: Arc<R>,
    storage: Arc<F>,
    compensate_failed_uploads: bool,
}

impl<R, F> AttachmentServiceImpl<R, F>
where
    R: AttachmentRepository,
    F: FileStorage,
{
    pub fn new(attachment_repo: Arc<R>, storage: Arc<F>) -> Self {
        Self {
            attachment_repo,
            storage,
            compensate_failed_uploads: true,
        }
    }

    /// Whether a blob is deleted again when its row insert fails.
    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate_failed_uploads = enabled;
        self
    }

    /// Delete a blob whose row was never written.
    ///
    /// The blob is kept when the insert may have committed anyway (cancelled,
    /// deadline, or a connection lost mid-statement): the row could exist.
    async fn discard_orphan(&self, stored_name: &str, insert_error: &AppError) {
        if !self.compensate_failed_uploads {
            warn!(file_name = %stored_name, "Attachment insert failed, stored file left in place");
            return;
        }
        if insert_error.outcome_unknown() {
            warn!(
                file_name = %stored_name,
                error = %insert_error,
                "Attachment insert outcome unknown, stored file kept"
            );
            return;
        }

        match self.storage.delete(stored_name).await {
            Ok(()) => debug!(file_name = %stored_name, "Discarded file of failed attachment insert"),
            Err(e) => {
                error!(file_name = %stored_name, error = %e, "Failed to discard orphaned file")
            }
        }
    }
}

#[async_trait]
impl<R, F> AttachmentService for AttachmentServiceImpl<R, F>
where
    R: AttachmentRepository + 'static,
    F: FileStorage + 'static,
{
    #[tracing::instrument(
        skip_all,
        fields(request_id = %ctx.request_id(), user_id = attachment.user_id, size = blob.len())
    )]
    async fn create_attachment(
        &self,
        ctx: &RequestContext,
        blob: &[u8],
        mut attachment: Attachment,
    ) -> Result<Attachment, ServiceError> {
        let stored = ctx
            .run(self.storage.store(blob, &attachment.file_name))
            .await
            .map_err(ServiceError::step("storing file"))?;

        attachment.file_name = stored.name;
        attachment.file_path = stored.path;
        attachment.file_size.get_or_insert(blob.len() as i64);

        match self.attachment_repo.insert(ctx, &attachment).await {
            Ok(created) => {
                debug!(attachment_id = created.id, file_name = %created.file_name, "Attachment created");
                Ok(created)
            }
            Err(e) => {
                self.discard_orphan(&attachment.file_name, &e).await;
                Err(ServiceError::step("saving attachment")(e))
            }
        }
    }

    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), file_id = file_id, user_id = user_id))]
    async fn delete_attachment(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(), ServiceError> {
        let (tx, file_name) = self
            .attachment_repo
            .delete_scoped(ctx, file_id, user_id)
            .await
            .map_err(ServiceError::step("deleting attachment"))?;

        if file_name.is_empty() {
            return Err(rollback_after(tx, ServiceError::AttachmentNotFound).await);
        }

        match ctx.run(self.storage.delete(&file_name)).await {
            Ok(()) => {}
            // Left over from an earlier delete whose commit failed
            Err(e) if e.is_not_found() => {
                warn!(file_name = %file_name, "File already gone, removing attachment row")
            }
            Err(e) => {
                warn!(file_name = %file_name, error = %e, "File delete failed, keeping attachment row");
                return Err(rollback_after(tx, ServiceError::step("deleting file")(e)).await);
            }
        }

        tx.commit().await.map_err(|e| {
            error!(file_name = %file_name, error = %e, "File deleted but row delete did not commit");
            ServiceError::Commit(e)
        })?;

        debug!(file_name = %file_name, "Attachment deleted");
        Ok(())
    }
}
