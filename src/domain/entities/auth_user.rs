//! AuthUser entity and credential store trait.
//!
//! Maps to the `auth` table in the database schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Credentials of a user account.
///
/// Maps to the `auth` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - password: TEXT NOT NULL (Argon2 hash)
/// - email: VARCHAR(255) NULL
/// - refresh_token: TEXT NULL
///
/// `password` holds the caller's plaintext on the way in and the stored hash
/// once fetched from the store. It is cleared before a login or registration
/// result leaves the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Store-assigned ID (0 until persisted)
    #[serde(default)]
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Plaintext password or stored hash, depending on the stage
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,

    /// Registration-only confirmation input, never persisted
    #[serde(default, skip_serializing)]
    pub confirm_password: String,

    /// Contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Opaque refresh token, rotated by the store on login and refresh
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,

    /// Signed access token issued by the orchestrator
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl AuthUser {
    /// Login input.
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Registration input.
    pub fn registration(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            ..Default::default()
        }
    }

    /// Refresh input.
    pub fn refresh(id: i64, refresh_token: impl Into<String>) -> Self {
        Self {
            id,
            refresh_token: refresh_token.into(),
            ..Default::default()
        }
    }

    /// Drop password material from the value.
    pub fn clear_auth(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
    }
}

/// Credential store adapter.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Fetch stored credentials (including the password hash) by username.
    ///
    /// Read only. Returns `AppError::NotFound` if no such user exists.
    async fn fetch_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<AuthUser, AppError>;

    /// Replace the stored refresh token of user `id` and return the new one.
    async fn rotate_refresh_token(&self, ctx: &RequestContext, id: i64)
        -> Result<String, AppError>;

    /// Insert a new user whose `password` already holds the hash.
    ///
    /// Returns `AppError::Conflict` if the username is taken.
    async fn insert(&self, ctx: &RequestContext, user: &AuthUser) -> Result<AuthUser, AppError>;

    /// Fetch credentials matching an (ID, refresh token) pair.
    ///
    /// Returns `AppError::NotFound` when the pair does not match.
    async fn fetch_by_refresh_token(
        &self,
        ctx: &RequestContext,
        id: i64,
        refresh_token: &str,
    ) -> Result<AuthUser, AppError>;
}
