//! Page loaders and action handlers.

pub mod cart;
pub mod product;
pub mod products;

pub use cart::{CartLineView, CartPage};
pub use product::ProductPage;
pub use products::{ProductsPage, ResultFilters};

use thiserror::Error;

use crate::api::ApiError;

/// Errors that prevent a page from loading.
#[derive(Debug, Error)]
pub enum PageError {
    /// The requested resource does not exist (or could not be fetched).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Loading the page's data failed.
    #[error("Failed to load page: {0}")]
    Api(#[from] ApiError),
}
