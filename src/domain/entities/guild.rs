//! Guild entity and repository trait.
//!
//! Maps to the `guild` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Channel;
use crate::domain::transaction::Transaction;
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Represents a guild (community) in the chat system.
///
/// Maps to the `guild` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - name: VARCHAR(100) NOT NULL
/// - description: TEXT NULL
/// - owner_id: BIGINT NOT NULL REFERENCES auth(id)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// `channels` is not a column; it is only filled on the joined-guilds read path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    /// Store-assigned ID (0 until persisted)
    #[serde(default)]
    pub id: i64,

    /// Guild name (1-100 characters)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User ID of the guild owner
    #[serde(default)]
    pub owner_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Channels visible to the requesting member, in store order
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Guild {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if a user is the owner of this guild.
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

/// Guild store adapter.
///
/// Membership gates channel reads; the orchestrator does not re-check it.
#[async_trait]
pub trait GuildRepository: Send + Sync {
    /// Transaction handle returned by [`GuildRepository::insert`].
    type Tx: Transaction;

    /// Begin a transaction and insert the guild row.
    ///
    /// Returns the open transaction and the guild with its assigned ID.
    async fn insert(
        &self,
        ctx: &RequestContext,
        guild: &Guild,
    ) -> Result<(Self::Tx, Guild), AppError>;

    /// Insert a membership row inside an open transaction.
    async fn add_member(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
        tx: &mut Self::Tx,
    ) -> Result<(), AppError>;

    /// Guilds the user is a member of, ordered by guild ID.
    async fn fetch_joined(&self, ctx: &RequestContext, user_id: i64)
        -> Result<Vec<Guild>, AppError>;

    /// Channels of a guild, empty unless the user is a member of it.
    async fn fetch_channels(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
    ) -> Result<Vec<Channel>, AppError>;
}
