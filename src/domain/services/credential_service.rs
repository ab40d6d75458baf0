//! Credential utility contract.

use async_trait::async_trait;

use crate::domain::entities::AuthUser;
use crate::shared::error::AppError;

/// Password hashing, verification and access-token issuance.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Hash a plaintext password.
    async fn hash_password(&self, password: &str) -> Result<String, AppError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// `Ok(false)` is a mismatch; `Err` means the check itself could not run
    /// (e.g. a malformed hash).
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError>;

    /// Issue a signed access token for the given credentials.
    async fn issue_token(&self, user: &AuthUser) -> Result<String, AppError>;
}
