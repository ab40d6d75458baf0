//! Orchestrator facade.
//!
//! One cloneable entry point that composes the auth, attachment and guild
//! services. It holds no mutable state of its own, so a single instance is
//! shared across every request task.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::error::ServiceError;
use crate::application::services::{AttachmentService, AuthService, GuildService};
use crate::domain::{Attachment, AuthUser, Guild};
use crate::shared::context::RequestContext;

/// Facade exposing all application operations.
#[derive(Clone)]
pub struct Orchestrator {
    auth: Arc<dyn AuthService>,
    attachments: Arc<dyn AttachmentService>,
    guilds: Arc<dyn GuildService>,
}

impl Orchestrator {
    pub fn new(
        auth: Arc<dyn AuthService>,
        attachments: Arc<dyn AttachmentService>,
        guilds: Arc<dyn GuildService>,
    ) -> Self {
        Self {
            auth,
            attachments,
            guilds,
        }
    }
}

#[async_trait]
impl AuthService for Orchestrator {
    async fn login(&self, ctx: &RequestContext, user: AuthUser) -> Result<AuthUser, ServiceError> {
        self.auth.login(ctx, user).await
    }

    async fn register(
        &self,
        ctx: &RequestContext,
        user: AuthUser,
    ) -> Result<AuthUser, ServiceError> {
        self.auth.register(ctx, user).await
    }

    async fn refresh_token(
        &self,
        ctx: &RequestContext,
        user: AuthUser,
    ) -> Result<AuthUser, ServiceError> {
        self.auth.refresh_token(ctx, user).await
    }
}

#[async_trait]
impl AttachmentService for Orchestrator {
    async fn create_attachment(
        &self,
        ctx: &RequestContext,
        blob: &[u8],
        attachment: Attachment,
    ) -> Result<Attachment, ServiceError> {
        self.attachments.create_attachment(ctx, blob, attachment).await
    }

    async fn delete_attachment(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(), ServiceError> {
        self.attachments
            .delete_attachment(ctx, file_id, user_id)
            .await
    }
}

#[async_trait]
impl GuildService for Orchestrator {
    async fn create_guild(
        &self,
        ctx: &RequestContext,
        guild: Guild,
        user_id: i64,
    ) -> Result<Guild, ServiceError> {
        self.guilds.create_guild(ctx, guild, user_id).await
    }

    async fn get_joined_guilds(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Guild>, ServiceError> {
        self.guilds.get_joined_guilds(ctx, user_id).await
    }
}
