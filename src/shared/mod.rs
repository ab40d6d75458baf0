//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod context;
pub mod error;

pub use context::{CancelHandle, RequestContext};
pub use error::AppError;
