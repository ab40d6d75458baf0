//! Attachment Repository Implementation
//!
//! PostgreSQL implementation of the AttachmentRepository trait.
//! Deletes run inside a transaction handed back to the caller, so the row
//! only disappears once the blob is gone too.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Attachment, AttachmentRepository};
use crate::infrastructure::database::TransactionContext;
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Database row representation matching the `attachment` table.
#[derive(Debug, sqlx::FromRow)]
struct AttachmentRow {
    id: i64,
    user_id: i64,
    file_name: String,
    file_path: String,
    file_size: Option<i64>,
    mime_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl AttachmentRow {
    fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: self.mime_type,
            created_at: Some(self.created_at),
        }
    }
}

/// PostgreSQL attachment store.
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    /// Create a new PgAttachmentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    type Tx = TransactionContext;

    async fn insert(
        &self,
        ctx: &RequestContext,
        attachment: &Attachment,
    ) -> Result<Attachment, AppError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, AttachmentRow>(
                    r#"
                    INSERT INTO attachment (user_id, file_name, file_path, file_size, mime_type)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, user_id, file_name, file_path, file_size, mime_type, created_at
                    "#,
                )
                .bind(attachment.user_id)
                .bind(&attachment.file_name)
                .bind(&attachment.file_path)
                .bind(attachment.file_size)
                .bind(&attachment.mime_type)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::from_insert(e, "Attachment"))
            })
            .await?;

        Ok(row.into_attachment())
    }

    async fn delete_scoped(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(TransactionContext, String), AppError> {
        ctx.run(async {
            let mut tx = TransactionContext::begin(&self.pool).await?;

            let file_name = sqlx::query_scalar::<_, String>(
                r#"
                DELETE FROM attachment
                WHERE id = $1 AND user_id = $2
                RETURNING file_name
                "#,
            )
            .bind(file_id)
            .bind(user_id)
            .fetch_optional(&mut **tx.as_mut())
            .await?
            .unwrap_or_default();

            Ok((tx, file_name))
        })
        .await
    }
}
