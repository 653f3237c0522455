//! # roastery-db
//!
//! PostgreSQL persistence for the roastery catalog.
//!
//! Provides the connection pool, embedded forward-only migrations, and the
//! catalog models (`Product`, `Variant`, `Price`, `SyncHash`) with their
//! query methods. Each model owns its SQL; services in the API crates call
//! these methods and never write SQL themselves.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
