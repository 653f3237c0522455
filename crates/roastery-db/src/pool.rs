//! Database connection pool.

use crate::error::DbError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Wrapper around the sqlx PostgreSQL pool with opinionated defaults.
#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Connect to PostgreSQL with default pool sizing.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(DbError::ConnectionFailed)?;

        tracing::info!("Database pool established");

        Ok(Self { pool })
    }

    /// Access the underlying sqlx pool.
    #[must_use]
    pub fn inner(&self) -> &PgPool {
        &self.pool
    }
}
