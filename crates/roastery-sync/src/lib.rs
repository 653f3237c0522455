//! # roastery-sync
//!
//! Outbound reconciliation between the local catalog and the Stripe catalog.
//!
//! `sync_stripe_ids` sweeps every local product (archived and inactive
//! included) and resolves its live Stripe counterpart through a tiered match:
//! stored id, exact name, metadata back-reference, fuzzy name. Stale ids are
//! repaired in place and the whole run is summarized in a [`SyncReport`].
//! Re-running against a converged catalog is a no-op with an all-ok report.

pub mod error;
pub mod matching;
pub mod report;
pub mod router;
pub mod service;

pub use error::SyncError;
pub use matching::{best_fuzzy_match, fuzzy_score, FUZZY_ACCEPT_THRESHOLD};
pub use report::{MatchStatus, MatchStrategy, ProductSyncResult, SyncReport};
pub use router::{admin_router, AdminState};
pub use service::Reconciler;
