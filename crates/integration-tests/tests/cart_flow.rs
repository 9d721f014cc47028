//! Cart flows with the cart service online.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use shopfront_core::{ProductId, ToastSeverity};
use shopfront_integration_tests::FakeRetailBackend;
use shopfront_storefront::AppState;
use shopfront_storefront::components::{Header, ToastContainer};
use shopfront_storefront::pages::{CartPage, ProductPage};
use shopfront_storefront::storage::{KeyValueStore, MemoryStore, keys};

fn state_with(backend: &FakeRetailBackend, storage: Arc<MemoryStore>) -> AppState {
    AppState::with_storage(backend.config(), storage)
}

#[tokio::test]
async fn test_add_from_product_page() {
    let backend = FakeRetailBackend::start().await;
    let storage = Arc::new(MemoryStore::new());
    let state = state_with(&backend, Arc::clone(&storage));
    let id = ProductId::new("1001");

    let page = ProductPage::load(state.client(), &id).await.unwrap();
    let toast = page.add_to_cart(state.cart(), state.toasts(), &id, 2).await;
    assert_eq!(toast.severity, ToastSeverity::Success);
    assert_eq!(toast.message, "Navy Blue Shirt added to cart!");

    let user_id = state.cart().user_id().as_str().to_string();
    let server = backend.server_cart(&user_id);
    assert_eq!(server.len(), 1);
    assert_eq!(server[0]["quantity"], 2);

    // The adopted server list is mirrored to local storage.
    let cached = storage.get(keys::CART).unwrap().unwrap();
    let cached: serde_json::Value = serde_json::from_str(&cached).unwrap();
    assert_eq!(cached["items"][0]["productId"], "1001");

    let header = Header::new(state.cart().clone(), &Default::default());
    assert_eq!(header.cart_badge(), Some(2));
}

#[tokio::test]
async fn test_cart_page_actions() {
    let backend = FakeRetailBackend::start().await;
    let state = state_with(&backend, Arc::new(MemoryStore::new()));
    let shirt = ProductId::new("1001");
    let shoes = ProductId::new("1002");

    state.cart().add_to_cart(&shirt, 1).await.unwrap();
    state.cart().add_to_cart(&shoes, 1).await.unwrap();
    state.cart().add_to_cart(&shirt, 1).await.unwrap();

    let page = CartPage::new(state.cart().clone(), state.toasts().clone());
    assert_eq!(page.title(), "Your Cart (2 items)");
    assert_eq!(page.subtotal(), "$121.97");

    let toast = page.increment(&shoes).await;
    assert_eq!(toast.message, "Trail Runner quantity updated to 2");
    assert_eq!(page.subtotal(), "$211.96");

    let toast = page.change_quantity(&shirt, 0).await;
    assert_eq!(toast.message, "Navy Blue Shirt removed from cart");
    assert_eq!(page.title(), "Your Cart (1 items)");

    let user_id = state.cart().user_id().as_str().to_string();
    assert_eq!(backend.server_cart(&user_id).len(), 1);

    let toast = page.clear_cart().await;
    assert_eq!(toast.message, "Cart cleared successfully");
    assert!(page.is_empty());
    assert!(backend.server_cart(&user_id).is_empty());

    let container = ToastContainer::new(state.toasts().clone());
    let messages: Vec<_> = container.views().into_iter().map(|v| v.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "ℹ Trail Runner quantity updated to 2",
            "ℹ Navy Blue Shirt removed from cart",
            "✓ Cart cleared successfully",
        ]
    );
}

#[tokio::test]
async fn test_load_adopts_server_cart_for_stored_user() {
    let backend = FakeRetailBackend::start().await;
    backend.set_server_cart(
        "user_returning",
        vec![json!({
            "productId": "1002",
            "name": "Trail Runner",
            "price": 8999,
            "quantity": 3
        })],
    );
    let storage = Arc::new(MemoryStore::with_entries([
        (keys::USER_ID, "user_returning"),
        (keys::CART, r#"{"items":[]}"#),
    ]));

    let state = state_with(&backend, storage);
    state.cart().load().await;

    assert_eq!(state.cart().cart_item_count(), 3);
    assert_eq!(
        CartPage::new(state.cart().clone(), state.toasts().clone()).subtotal(),
        "$269.97"
    );
}

#[tokio::test]
async fn test_adding_unknown_product_fails() {
    let backend = FakeRetailBackend::start().await;
    let state = state_with(&backend, Arc::new(MemoryStore::new()));

    // The service rejects the product and so does the local fallback lookup.
    let result = state.cart().add_to_cart(&ProductId::new("9999"), 1).await;
    assert!(result.is_err());
    assert!(state.cart().is_empty());
}
