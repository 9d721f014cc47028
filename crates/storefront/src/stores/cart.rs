//! Cart store.
//!
//! Every mutator tries the remote cart service first and adopts the list the
//! server returns. When the service is unreachable or refuses the request the
//! same mutation is applied locally instead. Either way the resulting state is
//! written to local storage so it survives a restart.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use rust_decimal::Decimal;
use shopfront_core::{CartLineItem, CartState, ProductId, UserId};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, RetailClient};
use crate::storage::{KeyValueStore, keys};

/// Length of the random part of an anonymous user ID.
const USER_ID_SUFFIX_LEN: usize = 9;

/// Errors surfaced by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product could not be looked up while adding it locally.
    #[error("{}", .0.user_message())]
    ProductLookup(#[source] ApiError),
}

// =============================================================================
// CartStore
// =============================================================================

/// Shared shopping cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    client: RetailClient,
    storage: Arc<dyn KeyValueStore>,
    user_id: UserId,
    state: RwLock<CartState>,
}

impl CartStore {
    /// Create an empty store for the shopper recorded in `storage`.
    ///
    /// A new anonymous user ID is generated and saved if none is stored yet.
    /// Call [`CartStore::load`] to populate the cart.
    #[must_use]
    pub fn new(client: RetailClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let user_id = resolve_user_id(storage.as_ref());
        Self {
            inner: Arc::new(CartStoreInner {
                client,
                storage,
                user_id,
                state: RwLock::new(CartState::new()),
            }),
        }
    }

    /// Anonymous ID the remote cart is keyed by.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.inner.user_id
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the cart from the remote service, falling back to the local copy.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn load(&self) {
        match self.inner.client.get_cart(&self.inner.user_id).await {
            Ok(items) => {
                debug!(lines = items.len(), "Loaded cart from server");
                self.commit(|state| state.replace(items));
                return;
            }
            Err(e) => {
                warn!(error = %e, "Remote cart unavailable, using local copy");
            }
        }

        let cached = self.read_cache();
        debug!(lines = cached.items().len(), "Loaded cart from local storage");
        self.commit(|state| *state = cached);
    }

    fn read_cache(&self) -> CartState {
        let raw = match self.inner.storage.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CartState::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cached cart");
                return CartState::new();
            }
        };
        CartState::from_cache_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Cached cart is corrupt, starting empty");
            CartState::new()
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// Adding zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductLookup` if the remote add failed and the
    /// product could not be fetched to add it locally. The cart is unchanged.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            debug!("Ignoring add of zero quantity");
            return Ok(());
        }

        match self
            .inner
            .client
            .add_to_cart(&self.inner.user_id, product_id, quantity)
            .await
        {
            Ok(items) => {
                self.commit(|state| state.replace(items));
                return Ok(());
            }
            Err(e) => warn!(error = %e, "Remote add failed, adding locally"),
        }

        let details = self
            .inner
            .client
            .get_product(product_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "Product lookup failed, cart unchanged");
                CartError::ProductLookup(e)
            })?;

        let mut item = CartLineItem::from_product(&details.product, quantity);
        item.product_id = product_id.clone();
        self.commit(|state| state.add_item(item));
        info!(quantity, "Added item to local cart");
        Ok(())
    }

    /// Remove a product's line.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id, product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) {
        match self
            .inner
            .client
            .remove_from_cart(&self.inner.user_id, product_id)
            .await
        {
            Ok(items) => self.commit(|state| state.replace(items)),
            Err(e) => {
                warn!(error = %e, "Remote remove failed, removing locally");
                self.commit(|state| state.remove_item(product_id));
            }
        }
    }

    /// Set a line's quantity. Zero or less removes the line.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id, product_id = %product_id))]
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        match self
            .inner
            .client
            .update_cart_item(&self.inner.user_id, product_id, quantity)
            .await
        {
            Ok(items) => self.commit(|state| state.replace(items)),
            Err(e) => {
                warn!(error = %e, "Remote update failed, updating locally");
                self.commit(|state| state.update_quantity(product_id, quantity));
            }
        }
    }

    /// Empty the cart.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn clear_cart(&self) {
        match self.inner.client.clear_cart(&self.inner.user_id).await {
            Ok(items) => self.commit(|state| state.replace(items)),
            Err(e) => {
                warn!(error = %e, "Remote clear failed, clearing locally");
                self.commit(CartState::clear);
            }
        }
    }

    /// Apply a mutation and write the result to local storage.
    fn commit(&self, mutate: impl FnOnce(&mut CartState)) {
        let mut state = self.write_state();
        mutate(&mut state);

        let persisted = state
            .to_cache_json()
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.inner
                    .storage
                    .set(keys::CART, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = persisted {
            warn!(%error, "Failed to persist cart");
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read_state().items().to_vec()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> Option<CartLineItem> {
        self.read_state().find(product_id).cloned()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_state().is_empty()
    }

    /// Sum of price times quantity in cents. Non-numeric prices count as zero.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.read_state().total()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn cart_item_count(&self) -> u64 {
        self.read_state().item_count()
    }

    // Cart state is plain data, so a panicked writer cannot break an invariant
    // the next reader relies on.
    fn read_state(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Anonymous user ID
// =============================================================================

fn resolve_user_id(storage: &dyn KeyValueStore) -> UserId {
    match storage.get(keys::USER_ID) {
        Ok(Some(id)) if !id.is_empty() => return UserId::new(id),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to read user ID, generating a new one"),
    }

    let user_id = generate_user_id();
    if let Err(e) = storage.set(keys::USER_ID, user_id.as_str()) {
        warn!(error = %e, "Failed to persist user ID");
    }
    info!(user_id = %user_id, "Generated anonymous user ID");
    user_id
}

/// `user_` followed by random lowercase base-36 characters.
fn generate_user_id() -> UserId {
    let mut rng = rand::rng();
    let suffix: String = (0..USER_ID_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();
    UserId::new(format!("user_{suffix}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::storage::MemoryStore;

    const USER: &str = "user_test12345";

    fn client_for(server: &MockServer) -> RetailClient {
        let base = Url::parse(&format!("{}/rest/v1", server.uri())).unwrap();
        RetailClient::new(base, Duration::from_secs(300))
    }

    fn storage() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([(keys::USER_ID, USER)]))
    }

    async fn cart_service_down(server: &MockServer) {
        Mock::given(path_regex(r"^/rest/v1/cart/.*"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "error": "Internal server error"
            })))
            .mount(server)
            .await;
    }

    async fn product_exists(server: &MockServer, id: &str, price: i64) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/get"))
            .and(query_param("prod", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": null,
                "product": {
                    "id": id,
                    "name": format!("Product {id}"),
                    "brandName": "Acme",
                    "price": price,
                    "images": {
                        "front": {"resolutions": {"125X161": "front.jpg"}}
                    }
                },
                "related": [],
                "also_bought": []
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_generated_user_id_format() {
        let id = generate_user_id();
        let suffix = id.as_str().strip_prefix("user_").unwrap();
        assert_eq!(suffix.len(), USER_ID_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_user_id_generated_once_and_reused() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = resolve_user_id(storage.as_ref());
        let second = resolve_user_id(storage.as_ref());
        assert_eq!(first, second);
        assert_eq!(
            storage.get(keys::USER_ID).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn test_remote_add_adopts_server_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/rest/v1/cart/{USER}/add")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "items": [
                    {"productId": "P9", "name": "Server line", "price": 100, "quantity": 4},
                    {"productId": "P1", "name": "Shirt", "price": 1599, "quantity": 2}
                ],
                "total": 3598,
                "itemCount": 6
            })))
            .mount(&server)
            .await;

        let storage = storage();
        let cart = CartStore::new(client_for(&server), storage.clone());
        cart.add_to_cart(&ProductId::new("P1"), 2).await.unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id.as_str(), "P9");
        assert_eq!(cart.cart_item_count(), 6);
        assert_eq!(cart.cart_total(), Decimal::from(3598));

        let raw = storage.get(keys::CART).unwrap().unwrap();
        let cached = CartState::from_cache_json(&raw).unwrap();
        assert_eq!(cached.items(), items.as_slice());
    }

    #[tokio::test]
    async fn test_local_add_merges_quantities() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;
        product_exists(&server, "P1", 1299).await;

        let cart = CartStore::new(client_for(&server), storage());
        let id = ProductId::new("P1");
        cart.add_to_cart(&id, 2).await.unwrap();
        cart.add_to_cart(&id, 3).await.unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].image.as_deref(), Some("front.jpg"));
        assert_eq!(items[0].brand_name.as_deref(), Some("Acme"));
        assert_eq!(cart.cart_total(), Decimal::from(6495));
    }

    #[tokio::test]
    async fn test_local_add_unknown_product_fails() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/get"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "Product not found"})),
            )
            .mount(&server)
            .await;

        let cart = CartStore::new(client_for(&server), storage());
        let err = cart
            .add_to_cart(&ProductId::new("missing"), 1)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Product not found");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_zero_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let cart = CartStore::new(client_for(&server), storage());
        cart.add_to_cart(&ProductId::new("P1"), 0).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_local_update_and_remove() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;
        product_exists(&server, "P1", 500).await;
        product_exists(&server, "P2", 700).await;

        let cart = CartStore::new(client_for(&server), storage());
        let p1 = ProductId::new("P1");
        let p2 = ProductId::new("P2");
        cart.add_to_cart(&p1, 1).await.unwrap();
        cart.add_to_cart(&p2, 1).await.unwrap();

        cart.update_quantity(&p1, 4).await;
        assert_eq!(cart.find(&p1).unwrap().quantity, 4);

        cart.update_quantity(&p1, 0).await;
        assert!(cart.find(&p1).is_none());

        cart.remove_from_cart(&p2).await;
        assert!(cart.is_empty());
        assert_eq!(cart.cart_item_count(), 0);
    }

    #[tokio::test]
    async fn test_local_clear_persists_empty_cart() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;
        product_exists(&server, "P1", 500).await;

        let storage = storage();
        let cart = CartStore::new(client_for(&server), storage.clone());
        cart.add_to_cart(&ProductId::new("P1"), 2).await.unwrap();
        cart.clear_cart().await;

        assert!(cart.is_empty());
        assert_eq!(
            storage.get(keys::CART).unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
    }

    #[tokio::test]
    async fn test_load_prefers_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/cart/{USER}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "items": [{"productId": "S1", "price": 250, "quantity": 2}]
            })))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::with_entries([
            (keys::USER_ID, USER),
            (keys::CART, r#"{"items":[{"productId":"L1","quantity":1}]}"#),
        ]));
        let cart = CartStore::new(client_for(&server), storage);
        cart.load().await;

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id.as_str(), "S1");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_legacy_cache() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;

        let storage = Arc::new(MemoryStore::with_entries([
            (keys::USER_ID, USER),
            (
                keys::CART,
                r#"[{"productId":"L1","price":300,"quantity":2},{"productId":"L2","quantity":1}]"#,
            ),
        ]));
        let cart = CartStore::new(client_for(&server), storage.clone());
        cart.load().await;

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.cart_item_count(), 3);
        assert_eq!(cart.cart_total(), Decimal::from(600));

        // Rewritten in the wrapped layout
        let raw = storage.get(keys::CART).unwrap().unwrap();
        assert!(raw.starts_with(r#"{"items":"#));
    }

    #[tokio::test]
    async fn test_load_with_corrupt_cache_is_empty() {
        let server = MockServer::start().await;
        cart_service_down(&server).await;

        let storage = Arc::new(MemoryStore::with_entries([
            (keys::USER_ID, USER),
            (keys::CART, "not json"),
        ]));
        let cart = CartStore::new(client_for(&server), storage);
        cart.load().await;

        assert!(cart.is_empty());
    }
}
