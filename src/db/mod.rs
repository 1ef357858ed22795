// ============================================================================
// Store Access
// ============================================================================
//
// Plain async functions over the Postgres pool, one file per collection:
// - users.rs: user directory records (shared with the auth service)
// - donors.rs: donor profiles
// - recipients.rs: posted blood requests
// - requests.rs: connection requests from recipients to donors
//
// ============================================================================

pub mod donors;
pub mod recipients;
pub mod requests;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

use crate::config::Config;
use crate::error::AppResult;

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(config: &Config) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .acquire_timeout(Duration::from_secs(config.db.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db.idle_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Liveness probe used by the health endpoint.
pub async fn ping(pool: &DbPool) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
