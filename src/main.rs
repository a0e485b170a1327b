//! DGH Care Backend
//!
//! Hospital management REST API: doctors, patients, appointments,
//! medications, feedback, reminders and dashboard statistics.

use dgh_care::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Configuration loaded successfully");
    info!("Starting DGH Care Backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        path = ?config.database.path,
        "Database configuration"
    );
    info!(sms_enabled = config.sms.enabled, "SMS configuration");

    // Initialize database (migrations run on open)
    info!("Initializing database...");
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        config.database.connection_pool_size as u32,
        std::time::Duration::from_millis(config.database.busy_timeout),
    )?);
    info!(
        path = ?db.db_path(),
        pool_size = db.pool_size(),
        "Database initialized successfully"
    );

    // Reference data and the first administrator
    db::seed::seed_feedback_categories(&db::FeedbackRepository::new(db.clone())).await?;
    db::seed::ensure_admin(
        &db::CredentialRepository::new(db.clone()),
        &config.bootstrap,
        config.security.bcrypt_cost,
    )
    .await?;

    let notifier = Arc::new(core::TwilioNotifier::new(config.sms.clone())?);

    // Initialize API server
    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, db, notifier).await?;

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
