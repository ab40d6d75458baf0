//! # Tranquility
//!
//! Bootstrap for the orchestration core. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - Attachment storage folder
//!
//! It then holds the wired orchestrator until interrupted.

use anyhow::Result;
use tracing::info;

use tranquility::config::Settings;
use tranquility::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    tranquility::telemetry::init_tracing();

    info!("Starting Tranquility...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        environment = %settings.environment,
        storage_folder = %settings.storage.folder,
        request_timeout_secs = settings.request.timeout_secs,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Orchestrator ready");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    application.shutdown().await;

    Ok(())
}
