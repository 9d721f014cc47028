//! Cart line items and the pure cart state machine.
//!
//! [`CartState`] applies the same merge/remove/update rules the backend does,
//! so a client that cannot reach the backend can keep mutating its local copy
//! and end up with the same result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product this line refers to. Unique within a cart.
    pub product_id: ProductId,
    /// Product name at the time it was added.
    #[serde(default)]
    pub name: Option<String>,
    /// Unit price.
    #[serde(default)]
    pub price: Option<Price>,
    /// Thumbnail URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Brand name.
    #[serde(default)]
    pub brand_name: Option<String>,
    /// Quantity, always at least 1 while the line is in a cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// Build a line item from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.clone(),
            image: product.thumbnail().map(str::to_string),
            brand_name: product.brand_name.clone(),
            quantity,
        }
    }

    /// Unit price times quantity, zero when the price is not numeric.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .as_ref()
            .and_then(Price::amount_cents)
            .map_or(Decimal::ZERO, |cents| cents * Decimal::from(self.quantity))
    }
}

/// Error decoding a cached cart blob.
#[derive(Debug, Error)]
pub enum CartCacheError {
    /// The blob is not valid JSON in either supported layout.
    #[error("invalid cart cache: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// On-disk layouts of the cached cart.
///
/// Older clients stored the bare item list; current ones wrap it in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CachedCart {
    Legacy(Vec<CartLineItem>),
    Wrapped {
        #[serde(default)]
        items: Vec<CartLineItem>,
    },
}

/// Ordered list of cart lines, one per product, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from a list of lines, dropping lines with zero quantity and
    /// merging duplicate products.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let mut state = Self::new();
        state.replace(items);
        state
    }

    /// Current lines.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Add a line, merging its quantity into an existing line for the same
    /// product. A zero quantity is ignored.
    pub fn add_item(&mut self, item: CartLineItem) {
        if item.quantity == 0 {
            return;
        }
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.items.push(item),
        }
    }

    /// Remove the line for a product, if present.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product_id != product_id);
    }

    /// Set the quantity of a line. Zero or negative quantities remove it.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.find_mut(product_id) {
            item.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the contents wholesale (e.g. with the server's view).
    pub fn replace(&mut self, items: Vec<CartLineItem>) {
        self.items.clear();
        for item in items {
            self.add_item(item);
        }
    }

    /// Sum of price × quantity in cents, treating non-numeric prices as zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Decode a cached cart blob in either the legacy list layout or the
    /// wrapped `{"items": [...]}` layout.
    ///
    /// # Errors
    ///
    /// Returns `CartCacheError::Invalid` if the blob matches neither layout.
    pub fn from_cache_json(raw: &str) -> Result<Self, CartCacheError> {
        let items = match serde_json::from_str::<CachedCart>(raw)? {
            CachedCart::Legacy(items) | CachedCart::Wrapped { items } => items,
        };
        Ok(Self::from_items(items))
    }

    /// Encode the cart in the wrapped cache layout.
    ///
    /// # Errors
    ///
    /// Returns `CartCacheError::Invalid` if serialization fails.
    pub fn to_cache_json(&self) -> Result<String, CartCacheError> {
        Ok(serde_json::to_string(self)?)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }
}
