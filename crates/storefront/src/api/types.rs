//! Response envelopes of the retail REST API.
//!
//! The backend wraps payloads in loosely typed JSON objects that signal failure
//! through an `error` field and/or a `success` flag. These types mirror that
//! wire shape; the client unwraps them into core domain types.

use serde::Deserialize;
use shopfront_core::{CartLineItem, Product, ProductDetails};

use super::ApiError;

/// `GET /get?prod=` body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub related: Vec<Product>,
    #[serde(default)]
    pub also_bought: Vec<Product>,
}

impl ProductResponse {
    pub(crate) fn into_details(self, product_id: &str) -> Result<ProductDetails, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::NotFound {
                id: product_id.to_string(),
                message: error,
            });
        }
        let product = self.product.ok_or_else(|| ApiError::NotFound {
            id: product_id.to_string(),
            message: "no product in response".to_string(),
        })?;
        Ok(ProductDetails {
            product,
            related: self.related,
            also_bought: self.also_bought,
        })
    }
}

/// Body returned by every `/cart/{userId}` endpoint.
///
/// The server's `total` and `itemCount` are ignored; the cart recomputes both
/// from its lines.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CartResponse {
    #[serde(default)]
    pub success: bool,
    /// Cart lines after the operation.
    #[serde(default)]
    pub items: Option<Vec<CartLineItem>>,
    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

impl CartResponse {
    /// Unwrap the cart lines of a successful response.
    ///
    /// When `require_items` is false a successful response without `items`
    /// yields an empty cart.
    pub(crate) fn into_items(self, require_items: bool) -> Result<Vec<CartLineItem>, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.error
                    .unwrap_or_else(|| "operation was not successful".to_string()),
            ));
        }
        match self.items {
            Some(items) => Ok(items),
            None if require_items => {
                Err(ApiError::Rejected("response has no cart items".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Body of a failed request, when the backend sends one.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
