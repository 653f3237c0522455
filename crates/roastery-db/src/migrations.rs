//! Database migration management.
//!
//! Migrations are embedded at compile time from the `migrations/` directory
//! and applied in filename order. Forward-only: fixing a released migration
//! means writing a new one.

use crate::error::DbError;
use crate::pool::DbPool;

/// Run all pending database migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool.inner())
        .await
        .map_err(DbError::MigrationFailed)?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    // Migration tests require a real database and live in integration tests
}
