//! # Domain Entities
//!
//! Core domain entities of the chat backend. Each persisted entity maps to its
//! database table.
//!
//! - **AuthUser**: Credentials, refresh token and issued access token
//! - **Attachment**: An uploaded file; the row points at a blob in file storage
//! - **Guild**: A community with an owner and channels
//! - **GuildMember**: A (guild, user) membership pair
//! - **Channel**: A communication space inside a guild
//!
//! ## Repository Traits
//!
//! Each aggregate has a store adapter trait defining its data access
//! operations. The PostgreSQL implementations live in the infrastructure layer.

mod attachment;
mod auth_user;
mod channel;
mod guild;
mod member;

pub use attachment::{Attachment, AttachmentRepository, MAX_ATTACHMENT_SIZE};
pub use auth_user::{AuthRepository, AuthUser};
pub use channel::Channel;
pub use guild::{Guild, GuildRepository};
pub use member::GuildMember;
