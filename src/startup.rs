//! Application Startup
//!
//! Wires the PostgreSQL adapters, local file storage and the credential
//! service into an [`Orchestrator`].

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::application::services::{AttachmentServiceImpl, AuthServiceImpl, GuildServiceImpl};
use crate::application::Orchestrator;
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgAttachmentRepository, PgAuthRepository, PgGuildRepository,
};
use crate::infrastructure::{JwtCredentialService, LocalFileStorage};
use crate::shared::context::RequestContext;

/// Application instance
pub struct Application {
    db: PgPool,
    orchestrator: Orchestrator,
    settings: Arc<Settings>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        let storage = LocalFileStorage::new(&settings.storage.folder);
        storage.ensure_destination().await?;
        tracing::info!(folder = %settings.storage.folder, "File storage ready");

        let orchestrator = Self::orchestrator_for(db.clone(), storage, &settings);

        Ok(Self {
            db,
            orchestrator,
            settings: Arc::new(settings),
        })
    }

    fn orchestrator_for(db: PgPool, storage: LocalFileStorage, settings: &Settings) -> Orchestrator {
        let credentials = Arc::new(JwtCredentialService::new(settings.jwt.clone()));

        let auth = AuthServiceImpl::new(Arc::new(PgAuthRepository::new(db.clone())), credentials);
        let attachments = AttachmentServiceImpl::new(
            Arc::new(PgAttachmentRepository::new(db.clone())),
            Arc::new(storage),
        )
        .with_compensation(settings.storage.compensate_failed_uploads);
        let guilds = GuildServiceImpl::new(Arc::new(PgGuildRepository::new(db)));

        Orchestrator::new(Arc::new(auth), Arc::new(attachments), Arc::new(guilds))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// A fresh context carrying the configured request deadline.
    pub fn request_context(&self) -> RequestContext {
        match self.settings.request.timeout() {
            Some(timeout) => RequestContext::new().with_timeout(timeout),
            None => RequestContext::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Close the connection pool, waiting for checked-out connections.
    pub async fn shutdown(self) {
        self.db.close().await;
        tracing::info!("Database connection pool closed");
    }
}
