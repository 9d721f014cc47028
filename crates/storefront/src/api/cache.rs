//! Cache types for catalog responses.

use shopfront_core::ProductDetails;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductDetails>),
    Options(Vec<String>),
}

/// Cache key for a product lookup.
pub fn product_key(product_id: &str) -> String {
    format!("product:{product_id}")
}

/// Cache key for a filter option list.
pub fn options_key(endpoint: &str) -> String {
    format!("options:{endpoint}")
}
