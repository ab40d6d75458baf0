//! Unit of Work
//!
//! Wraps a SQLx transaction so it can travel between adapter calls as a
//! domain [`Transaction`] handle. The orchestrator finishes it; an unfinished
//! handle is rolled back by SQLx when dropped.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use crate::domain::Transaction;
use crate::shared::error::AppError;

/// Transaction context that wraps a SQLx transaction.
pub struct TransactionContext {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl TransactionContext {
    /// Begin a new transaction on the pool.
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        let tx = pool.begin().await.map_err(AppError::Database)?;
        Ok(Self { tx })
    }

    /// Get a reference to the underlying transaction for query execution.
    pub fn as_mut(&mut self) -> &mut sqlx::Transaction<'static, Postgres> {
        &mut self.tx
    }
}

#[async_trait]
impl Transaction for TransactionContext {
    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(AppError::Database)
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await.map_err(AppError::Database)
    }
}
