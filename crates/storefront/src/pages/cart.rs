//! Cart page.

use shopfront_core::{CartLineItem, ProductId, ToastMessage};
use tracing::instrument;

use crate::filters;
use crate::stores::{CartStore, ToastStore};

/// Shown instead of the item list when the cart has no lines.
pub const EMPTY_MESSAGE: &str = "Your cart is empty";

/// Image used for lines without a thumbnail.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

const UNKNOWN_NAME: &str = "Item";

/// Display data for one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub image: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartLineItem> for CartLineView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone().unwrap_or_default(),
            brand: item.brand_name.clone(),
            image: item
                .image
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            price: filters::price_or_na(item.price.as_ref()),
            quantity: item.quantity,
            line_total: filters::line_total(item),
        }
    }
}

/// Cart page: line views and the quantity, remove and clear actions.
///
/// Each action reports its outcome as a toast and returns it.
#[derive(Clone)]
pub struct CartPage {
    cart: CartStore,
    toasts: ToastStore,
}

impl CartPage {
    #[must_use]
    pub const fn new(cart: CartStore, toasts: ToastStore) -> Self {
        Self { cart, toasts }
    }

    /// `Your Cart (n items)` where n counts lines, or plain `Your Cart` when
    /// the cart is empty.
    #[must_use]
    pub fn title(&self) -> String {
        let lines = self.cart.items().len();
        if lines == 0 {
            "Your Cart".to_string()
        } else {
            format!("Your Cart ({lines} items)")
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLineView> {
        self.cart.items().iter().map(CartLineView::from).collect()
    }

    /// Formatted cart total.
    #[must_use]
    pub fn subtotal(&self) -> String {
        filters::cents(self.cart.cart_total())
    }

    /// Set a line's quantity. Zero or less removes the line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn change_quantity(&self, product_id: &ProductId, quantity: i64) -> ToastMessage {
        let name = self.name_of(product_id);
        if quantity <= 0 {
            self.cart.remove_from_cart(product_id).await;
            return self
                .toasts
                .show_info(format!("{name} removed from cart"), None);
        }
        self.cart.update_quantity(product_id, quantity).await;
        self.toasts
            .show_info(format!("{name} quantity updated to {quantity}"), None)
    }

    /// The `+` button.
    pub async fn increment(&self, product_id: &ProductId) -> ToastMessage {
        let quantity = self.current_quantity(product_id);
        self.change_quantity(product_id, quantity + 1).await
    }

    /// The `-` button. Going below one removes the line.
    pub async fn decrement(&self, product_id: &ProductId) -> ToastMessage {
        let quantity = self.current_quantity(product_id);
        self.change_quantity(product_id, quantity - 1).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> ToastMessage {
        let name = self.name_of(product_id);
        self.cart.remove_from_cart(product_id).await;
        self.toasts
            .show_info(format!("{name} removed from cart"), None)
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> ToastMessage {
        self.cart.clear_cart().await;
        self.toasts.show_success("Cart cleared successfully", None)
    }

    fn name_of(&self, product_id: &ProductId) -> String {
        self.cart
            .find(product_id)
            .and_then(|item| item.name)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    fn current_quantity(&self, product_id: &ProductId) -> i64 {
        self.cart
            .find(product_id)
            .map_or(0, |item| i64::from(item.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use shopfront_core::ToastSeverity;
    use url::Url;
    use wiremock::matchers::path_regex;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::RetailClient;
    use crate::storage::{KeyValueStore, MemoryStore, keys};

    /// A cart page whose backend always fails, seeded from the local cache.
    async fn offline_page(cache: serde_json::Value) -> (CartPage, MockServer) {
        let server = MockServer::start().await;
        Mock::given(path_regex(r"^/rest/v1/cart"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let storage = MemoryStore::new();
        storage.set(keys::CART, &cache.to_string()).unwrap();
        let base = Url::parse(&format!("{}/rest/v1", server.uri())).unwrap();
        let client = RetailClient::new(base, Duration::from_secs(300));
        let cart = CartStore::new(client, Arc::new(storage));
        cart.load().await;

        (CartPage::new(cart, ToastStore::new(Duration::ZERO)), server)
    }

    fn seeded() -> serde_json::Value {
        json!({"items": [
            {"productId": "A", "name": "Tee", "price": 1500, "quantity": 2},
            {"productId": "B", "name": "Cap", "price": "TBD", "quantity": 1,
             "image": "http://img/cap.jpg"}
        ]})
    }

    #[tokio::test]
    async fn test_views() {
        let (page, _server) = offline_page(seeded()).await;

        assert_eq!(page.title(), "Your Cart (2 items)");
        assert_eq!(page.subtotal(), "$30.00");

        let lines = page.lines();
        assert_eq!(lines[0].image, PLACEHOLDER_IMAGE);
        assert_eq!(lines[0].price, "$15.00");
        assert_eq!(lines[0].line_total, "$30.00");
        assert_eq!(lines[1].price, "TBD");
        assert_eq!(lines[1].line_total, "N/A");
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let (page, _server) = offline_page(json!({"items": []})).await;
        assert!(page.is_empty());
        assert_eq!(page.title(), "Your Cart");
        assert_eq!(page.subtotal(), "$0.00");
    }

    #[tokio::test]
    async fn test_change_quantity() {
        let (page, _server) = offline_page(seeded()).await;
        let id = ProductId::new("A");

        let toast = page.change_quantity(&id, 5).await;
        assert_eq!(toast.message, "Tee quantity updated to 5");
        assert_eq!(toast.severity, ToastSeverity::Info);

        let toast = page.increment(&id).await;
        assert_eq!(toast.message, "Tee quantity updated to 6");

        let toast = page.change_quantity(&id, 0).await;
        assert_eq!(toast.message, "Tee removed from cart");
        assert_eq!(page.title(), "Your Cart (1 items)");
    }

    #[tokio::test]
    async fn test_decrement_last_unit_removes() {
        let (page, _server) = offline_page(seeded()).await;
        let toast = page.decrement(&ProductId::new("B")).await;
        assert_eq!(toast.message, "Cap removed from cart");
        assert!(page.lines().iter().all(|l| l.product_id.as_str() != "B"));
    }

    #[tokio::test]
    async fn test_unknown_item_name() {
        let (page, _server) = offline_page(seeded()).await;
        let toast = page.remove_item(&ProductId::new("Z")).await;
        assert_eq!(toast.message, "Item removed from cart");
        assert_eq!(page.lines().len(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let (page, _server) = offline_page(seeded()).await;
        let toast = page.clear_cart().await;
        assert_eq!(toast.severity, ToastSeverity::Success);
        assert_eq!(toast.message, "Cart cleared successfully");
        assert!(page.is_empty());
    }
}
