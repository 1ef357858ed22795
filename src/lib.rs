// ============================================================================
// Lifelink Server
// ============================================================================
//
// Backend for a blood donation matching service. Donors publish profiles,
// recipients post blood requests and reach donors through connection
// requests; a profile facade exposes both roles behind one surface.
//
// ============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod utils;

use context::AppContext;

/// Serve the API on an already-bound listener
pub async fn run(app_context: Arc<AppContext>, listener: TcpListener) -> Result<()> {
    let app = routes::create_router(app_context);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
