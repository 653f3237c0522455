//! Catalog models.

pub mod price;
pub mod product;
pub mod sync_hash;
pub mod variant;
pub mod webhook_event;

pub use price::{CreatePrice, Price, PriceInterval, PriceType, UpdatePrice};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use sync_hash::{SyncHash, SyncHashRecord, SyncSource};
pub use variant::{CreateVariant, Variant, VariantSyncUpdate};
pub use webhook_event::WebhookEvent;
