//! Transaction handle contract.
//!
//! An adapter that opens a transaction hands the handle back to its caller.
//! The caller, never the adapter, decides the outcome. Both terminal actions
//! consume the handle, so a transaction can only be finished once.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// An open atomic unit of work against the relational store.
///
/// Dropping a handle without finishing it must discard its writes.
#[async_trait]
pub trait Transaction: Send + Sized + 'static {
    /// Make every write staged in this transaction durable.
    async fn commit(self) -> Result<(), AppError>;

    /// Discard every write staged in this transaction.
    async fn rollback(self) -> Result<(), AppError>;
}
