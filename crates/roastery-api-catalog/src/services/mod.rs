//! Catalog services: business rules between the handlers and the models.

pub mod price_service;
pub mod product_service;
pub mod variant_service;

pub use price_service::PriceService;
pub use product_service::ProductService;
pub use variant_service::VariantService;
