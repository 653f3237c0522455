//! Error types for the roastery-db crate.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness or referential-integrity constraint was violated.
    #[error("Constraint violated: {0}")]
    ConstraintViolated(String),
}

impl DbError {
    /// Classify a raw sqlx error, mapping unique/foreign-key violations to
    /// [`DbError::ConstraintViolated`].
    pub fn from_query(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return DbError::ConstraintViolated(db_err.message().to_string());
            }
        }
        DbError::QueryFailed(err)
    }

    /// True when this error is a uniqueness or foreign-key violation.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolated(_))
    }
}
