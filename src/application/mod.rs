//! Application Layer
//!
//! Services that coordinate the store adapters and collaborators, the shared
//! error taxonomy, and the `Orchestrator` facade that exposes every operation
//! through one handle.

pub mod error;
pub mod orchestrator;
pub mod services;

pub use error::{ErrorKind, ServiceError};
pub use orchestrator::Orchestrator;
