// ============================================================================
// Lifelink Server
// ============================================================================
//
// Matching backend for blood donation. Handles:
// - Donor profiles and availability
// - Recipient blood request postings
// - Connection requests between recipients and donors
// - Cross-role profile facade
//
// Token issuance lives in the external auth service; this server only
// verifies bearer tokens against the shared secret.
//
// ============================================================================

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifelink_server::auth::AuthManager;
use lifelink_server::config::Config;
use lifelink_server::context::AppContext;
use lifelink_server::db;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    let config = Arc::new(config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Lifelink Server Starting ===");
    info!("Port: {}", config.port);

    // Initialize database
    info!("Connecting to database...");
    let db_pool = Arc::new(
        db::create_pool(&config)
            .await
            .context("Failed to connect to database")?,
    );
    info!("Connected to database");

    // Apply pending migrations
    sqlx::migrate!("./migrations")
        .run(db_pool.as_ref())
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    // Initialize Auth Manager
    let auth_manager =
        Arc::new(AuthManager::new(&config).context("Failed to initialize auth manager")?);

    // Create application context
    let app_context = Arc::new(AppContext::new(db_pool, auth_manager, config.clone()));

    // Start server
    let addr: SocketAddr = format!("[::]:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("Lifelink Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    lifelink_server::run(app_context, listener).await
}
