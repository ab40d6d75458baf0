//! # Domain Layer
//!
//! Entities, store adapter contracts and collaborator service contracts.
//! Nothing in here knows about PostgreSQL or the filesystem.
//!
//! ## Structure
//!
//! - **entities**: AuthUser, Attachment, Guild, GuildMember, Channel and the
//!   store adapter trait that persists each of them
//! - **services**: File storage and credential utility contracts
//! - **transaction**: The transaction handle threaded between adapter calls

pub mod entities;
pub mod services;
pub mod transaction;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use transaction::Transaction;
