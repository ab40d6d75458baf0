//! Guild Repository Implementation
//!
//! PostgreSQL implementation of the GuildRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Channel, Guild, GuildRepository};
use crate::infrastructure::database::TransactionContext;
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Database row representation matching the `guild` table.
#[derive(Debug, sqlx::FromRow)]
struct GuildRow {
    id: i64,
    name: String,
    description: Option<String>,
    owner_id: i64,
    created_at: DateTime<Utc>,
}

impl GuildRow {
    fn into_guild(self) -> Guild {
        Guild {
            id: self.id,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            created_at: Some(self.created_at),
            channels: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    guild_id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    fn into_channel(self) -> Channel {
        Channel {
            id: self.id,
            guild_id: self.guild_id,
            name: self.name,
            created_at: Some(self.created_at),
        }
    }
}

/// PostgreSQL guild store.
#[derive(Clone)]
pub struct PgGuildRepository {
    pool: PgPool,
}

impl PgGuildRepository {
    /// Create a new PgGuildRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuildRepository for PgGuildRepository {
    type Tx = TransactionContext;

    async fn insert(
        &self,
        ctx: &RequestContext,
        guild: &Guild,
    ) -> Result<(TransactionContext, Guild), AppError> {
        ctx.run(async {
            let mut tx = TransactionContext::begin(&self.pool).await?;

            let row = sqlx::query_as::<_, GuildRow>(
                r#"
                INSERT INTO guild (name, description, owner_id)
                VALUES ($1, $2, $3)
                RETURNING id, name, description, owner_id, created_at
                "#,
            )
            .bind(&guild.name)
            .bind(&guild.description)
            .bind(guild.owner_id)
            .fetch_one(&mut **tx.as_mut())
            .await
            .map_err(|e| AppError::from_insert(e, "Guild"))?;

            Ok((tx, row.into_guild()))
        })
        .await
    }

    async fn add_member(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
        tx: &mut TransactionContext,
    ) -> Result<(), AppError> {
        ctx.run(async {
            sqlx::query(
                r#"
                INSERT INTO member (guild_id, user_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(guild_id)
            .bind(user_id)
            .execute(&mut **tx.as_mut())
            .await
            .map_err(|e| AppError::from_insert(e, "Member"))?;

            Ok(())
        })
        .await
    }

    async fn fetch_joined(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Guild>, AppError> {
        let rows = ctx
            .run(async {
                sqlx::query_as::<_, GuildRow>(
                    r#"
                    SELECT g.id, g.name, g.description, g.owner_id, g.created_at
                    FROM guild g
                    INNER JOIN member m ON m.guild_id = g.id
                    WHERE m.user_id = $1
                    ORDER BY g.id
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)
            })
            .await?;

        Ok(rows.into_iter().map(|r| r.into_guild()).collect())
    }

    async fn fetch_channels(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
    ) -> Result<Vec<Channel>, AppError> {
        let rows = ctx
            .run(async {
                sqlx::query_as::<_, ChannelRow>(
                    r#"
                    SELECT c.id, c.guild_id, c.name, c.created_at
                    FROM channel c
                    INNER JOIN member m ON m.guild_id = c.guild_id
                    WHERE c.guild_id = $1 AND m.user_id = $2
                    ORDER BY c.id
                    "#,
                )
                .bind(guild_id)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)
            })
            .await?;

        Ok(rows.into_iter().map(|r| r.into_channel()).collect())
    }
}
