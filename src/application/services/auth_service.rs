//! Authentication Service
//!
//! Handles login, registration and access-token refresh on top of the
//! credential store and the credential service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::error::ServiceError;
use crate::domain::{AuthRepository, AuthUser, CredentialService};
use crate::shared::context::RequestContext;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a username/password pair and issue an access token.
    ///
    /// The stored refresh token is rotated only after the password matched and
    /// the access token was issued. The returned credentials carry both tokens,
    /// never the password hash.
    async fn login(&self, ctx: &RequestContext, user: AuthUser) -> Result<AuthUser, ServiceError>;

    /// Hash the password and create the user.
    async fn register(&self, ctx: &RequestContext, user: AuthUser)
        -> Result<AuthUser, ServiceError>;

    /// Issue a new access token for a matching (ID, refresh token) pair.
    ///
    /// Returns whatever the store hands back plus the token; the password
    /// field is not cleared here.
    async fn refresh_token(
        &self,
        ctx: &RequestContext,
        user: AuthUser,
    ) -> Result<AuthUser, ServiceError>;
}

/// AuthService implementation
pub struct AuthServiceImpl<R, C>
where
    R: AuthRepository,
    C: CredentialService,
{
    auth_repo: Arc<R>,
    credentials: Arc<C>,
}

impl<R, C> AuthServiceImpl<R, C>
where
    R: AuthRepository,
    C: CredentialService,
{
    /// Create a new AuthServiceImpl
    pub fn new(auth_repo: Arc<R>, credentials: Arc<C>) -> Self {
        Self {
            auth_repo,
            credentials,
        }
    }

    async fn issue_token(
        &self,
        ctx: &RequestContext,
        user: &AuthUser,
    ) -> Result<String, ServiceError> {
        ctx.run(self.credentials.issue_token(user))
            .await
            .map_err(ServiceError::mechanism("generating token"))
    }
}

#[async_trait]
impl<R, C> AuthService for AuthServiceImpl<R, C>
where
    R: AuthRepository + 'static,
    C: CredentialService + 'static,
{
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), username = %user.username))]
    async fn login(&self, ctx: &RequestContext, user: AuthUser) -> Result<AuthUser, ServiceError> {
        if user.password.is_empty() {
            return Err(ServiceError::MissingPassword);
        }

        let mut credentials = self
            .auth_repo
            .fetch_by_username(ctx, &user.username)
            .await?;

        let matched = ctx
            .run(
                self.credentials
                    .verify_password(&user.password, &credentials.password),
            )
            .await
            .map_err(ServiceError::mechanism("verifying password"))?;

        if !matched {
            debug!("Password did not match");
            return Err(ServiceError::InvalidCredentials);
        }

        credentials.token = self.issue_token(ctx, &credentials).await?;
        credentials.refresh_token = self
            .auth_repo
            .rotate_refresh_token(ctx, credentials.id)
            .await
            .map_err(ServiceError::step("rotating refresh token"))?;
        credentials.clear_auth();

        debug!(user_id = credentials.id, "Login succeeded");
        Ok(credentials)
    }

    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), username = %user.username))]
    async fn register(
        &self,
        ctx: &RequestContext,
        mut user: AuthUser,
    ) -> Result<AuthUser, ServiceError> {
        if user.password.is_empty() || user.confirm_password.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }
        if user.password != user.confirm_password {
            debug!("Password confirmation did not match");
            return Err(ServiceError::InvalidCredentials);
        }

        let hash = ctx
            .run(self.credentials.hash_password(&user.password))
            .await
            .map_err(ServiceError::mechanism("hashing password while registering user"))?;

        user.password = hash;
        user.confirm_password.clear();

        let mut created = self
            .auth_repo
            .insert(ctx, &user)
            .await
            .map_err(ServiceError::step("registering user"))?;
        created.clear_auth();

        debug!(user_id = created.id, "User registered");
        Ok(created)
    }

    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), user_id = user.id))]
    async fn refresh_token(
        &self,
        ctx: &RequestContext,
        user: AuthUser,
    ) -> Result<AuthUser, ServiceError> {
        if user.id == 0 || user.refresh_token.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }

        let mut credentials = self
            .auth_repo
            .fetch_by_refresh_token(ctx, user.id, &user.refresh_token)
            .await?;

        credentials.token = self.issue_token(ctx, &credentials).await?;

        Ok(credentials)
    }
}
