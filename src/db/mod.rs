//! Postgres pool for [`crate::repository::PgUserStore`]
//!
//! Only used when `DATABASE_URL` is set; the `users` schema lives in
//! `migrations/` and is applied at startup.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Could not reach the user database: {0}")]
    ConnectionError(String),

    #[error("Could not apply the users schema: {0}")]
    MigrationError(String),
}

/// Open the pool backing the user store
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;

    tracing::info!(max_connections, "User database pool ready");

    Ok(pool)
}

/// Apply pending migrations for the `users` table
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    tracing::info!("Users schema up to date");

    Ok(())
}
