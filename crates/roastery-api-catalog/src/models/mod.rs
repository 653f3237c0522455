//! Request and response models.

pub mod requests;
pub mod responses;

pub use requests::{
    AssignPriceRequest, CreatePriceRequest, CreateProductRequest, ListQuery,
    UpdatePriceRequest, UpdateProductRequest,
};
pub use responses::{GeneratedVariantsResponse, ProductListResponse};
