//! Product catalog.

mod aggregate;
mod service;

pub use aggregate::Product;
pub use service::ProductService;

use crate::id::string_id;

string_id!(
    /// Product identifier (six-digit code for generated products).
    ProductId,
    "Product ID"
);
