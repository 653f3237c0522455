//! # roastery-api-catalog
//!
//! REST facade over the catalog: products, variants, prices.
//!
//! Handlers are thin (parse, validate, delegate to a service, serialize);
//! services own the pool and publish domain events after their writes commit.
//! Errors use the envelope `{message, code, validationErrors?, details?}`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod validation;

pub use error::CatalogError;
pub use router::{catalog_router, CatalogState};
