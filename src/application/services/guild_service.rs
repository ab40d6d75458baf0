//! Guild Service
//!
//! Guild provisioning and the joined-guilds read path.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::error::ServiceError;
use crate::application::services::rollback_after;
use crate::domain::{Guild, GuildRepository, Transaction};
use crate::shared::context::RequestContext;

/// Guild service trait
#[async_trait]
pub trait GuildService: Send + Sync {
    /// Create a guild owned by `user_id` together with the owner's membership.
    ///
    /// Both rows commit together or neither does.
    async fn create_guild(
        &self,
        ctx: &RequestContext,
        guild: Guild,
        user_id: i64,
    ) -> Result<Guild, ServiceError>;

    /// Guilds the user belongs to, each with its channels.
    ///
    /// Any per-guild channel fetch failure fails the whole read.
    async fn get_joined_guilds(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Guild>, ServiceError>;
}

/// GuildService implementation
pub struct GuildServiceImpl<G>
where
    G: GuildRepository,
{
    guild_repo: Arc<G>,
}

impl<G> GuildServiceImpl<G>
where
    G: GuildRepository,
{
    pub fn new(guild_repo: Arc<G>) -> Self {
        Self { guild_repo }
    }
}

#[async_trait]
impl<G> GuildService for GuildServiceImpl<G>
where
    G: GuildRepository + 'static,
{
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), user_id = user_id))]
    async fn create_guild(
        &self,
        ctx: &RequestContext,
        mut guild: Guild,
        user_id: i64,
    ) -> Result<Guild, ServiceError> {
        guild.owner_id = user_id;
        guild.channels.clear();

        let (mut tx, created) = self
            .guild_repo
            .insert(ctx, &guild)
            .await
            .map_err(ServiceError::step("creating guild"))?;

        if let Err(e) = self
            .guild_repo
            .add_member(ctx, created.id, user_id, &mut tx)
            .await
        {
            warn!(guild_id = created.id, error = %e, "Adding owner failed, rolling back guild");
            return Err(rollback_after(tx, ServiceError::step("adding guild member")(e)).await);
        }

        tx.commit().await.map_err(ServiceError::Commit)?;

        debug!(guild_id = created.id, "Guild created");
        Ok(created)
    }

    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id(), user_id = user_id))]
    async fn get_joined_guilds(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Guild>, ServiceError> {
        let mut guilds = self
            .guild_repo
            .fetch_joined(ctx, user_id)
            .await
            .map_err(ServiceError::step("fetching joined guilds"))?;

        for guild in &mut guilds {
            guild.channels = self
                .guild_repo
                .fetch_channels(ctx, guild.id, user_id)
                .await
                .map_err(ServiceError::step("fetching guild channels"))?;
        }

        Ok(guilds)
    }
}
