//! Repository Implementations
//!
//! PostgreSQL implementations of the domain store traits. Every query runs
//! under the caller's [`RequestContext`](crate::shared::context::RequestContext).
//!
//! ## Available Repositories
//!
//! - **PgAuthRepository** - Credentials and refresh-token rotation
//! - **PgAttachmentRepository** - Attachment rows, transactional delete
//! - **PgGuildRepository** - Guilds, memberships and member-gated channel reads
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgAttachmentRepository, PgAuthRepository, PgGuildRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let auth_repo = PgAuthRepository::new(pool.clone());
//!     let attachment_repo = PgAttachmentRepository::new(pool.clone());
//!     let guild_repo = PgGuildRepository::new(pool);
//! }
//! ```

pub mod attachment_repository;
pub mod auth_repository;
pub mod guild_repository;

pub use attachment_repository::PgAttachmentRepository;
pub use auth_repository::PgAuthRepository;
pub use guild_repository::PgGuildRepository;
