//! Infrastructure Layer
//!
//! Contains implementations of the domain collaborators:
//! - Database pool, migrations and transactions (PostgreSQL)
//! - Store adapters (repositories)
//! - Local file storage
//! - Password hashing and access tokens

pub mod credentials;
pub mod database;
pub mod repositories;
pub mod storage;

pub use credentials::JwtCredentialService;
pub use storage::LocalFileStorage;
