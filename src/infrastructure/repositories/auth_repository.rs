//! Auth Repository Implementation
//!
//! PostgreSQL implementation of the AuthRepository trait.
//! The username lookup is a plain read; login rotates the refresh token with a
//! separate statement once the password has matched. Refresh rotates it in the
//! same statement that checks the presented token.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{AuthRepository, AuthUser};
use crate::shared::context::RequestContext;
use crate::shared::error::AppError;

/// Database row representation matching the `auth` table.
#[derive(Debug, sqlx::FromRow)]
struct AuthRow {
    id: i64,
    username: String,
    #[sqlx(default)]
    password: String,
    email: Option<String>,
    refresh_token: Option<String>,
}

impl AuthRow {
    fn into_auth_user(self) -> AuthUser {
        AuthUser {
            id: self.id,
            username: self.username,
            password: self.password,
            email: self.email,
            refresh_token: self.refresh_token.unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Generate an opaque refresh token.
fn new_refresh_token() -> String {
    format!("{}.{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// PostgreSQL credential store.
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    /// Create a new PgAuthRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn fetch_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<AuthUser, AppError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, AuthRow>(
                    r#"
                    SELECT id, username, password, email, refresh_token
                    FROM auth
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

        Ok(row.into_auth_user())
    }

    async fn rotate_refresh_token(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<String, AppError> {
        ctx.run(async {
            sqlx::query_scalar::<_, String>(
                r#"
                UPDATE auth
                SET refresh_token = $2,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING refresh_token
                "#,
            )
            .bind(id)
            .bind(new_refresh_token())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn insert(&self, ctx: &RequestContext, user: &AuthUser) -> Result<AuthUser, AppError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, AuthRow>(
                    r#"
                    INSERT INTO auth (username, password, email, refresh_token)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, username, email, refresh_token
                    "#,
                )
                .bind(&user.username)
                .bind(&user.password)
                .bind(&user.email)
                .bind(new_refresh_token())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::from_insert(e, "User with this username"))
            })
            .await?;

        Ok(row.into_auth_user())
    }

    /// The stored password hash is not selected.
    async fn fetch_by_refresh_token(
        &self,
        ctx: &RequestContext,
        id: i64,
        refresh_token: &str,
    ) -> Result<AuthUser, AppError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, AuthRow>(
                    r#"
                    UPDATE auth
                    SET refresh_token = $3,
                        updated_at = NOW()
                    WHERE id = $1 AND refresh_token = $2
                    RETURNING id, username, email, refresh_token
                    "#,
                )
                .bind(id)
                .bind(refresh_token)
                .bind(new_refresh_token())
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No session for user {}", id)))?;

        Ok(row.into_auth_user())
    }
}
