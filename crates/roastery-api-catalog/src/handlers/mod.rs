//! HTTP handlers: parse, validate, delegate, serialize.

pub mod prices;
pub mod products;
pub mod variants;

pub use prices::{
    create_price_handler, delete_price_handler, get_price_handler, list_prices_handler,
    price_variants_handler, update_price_handler,
};
pub use products::{
    archive_product_handler, create_product_handler, delete_product_handler,
    get_product_handler, list_products_handler, product_prices_handler,
    update_product_handler,
};
pub use variants::{
    assign_price_handler, generate_variants_handler, product_variants_handler,
};
