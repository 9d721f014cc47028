//! Application state shared across front ends.

use std::sync::Arc;

use crate::api::RetailClient;
use crate::config::StorefrontConfig;
use crate::error::set_sentry_user;
use crate::storage::{FileStore, KeyValueStore};
use crate::stores::{CartStore, ToastStore};

/// Application state shared by every view.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the API
/// client and the cart and toast stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: RetailClient,
    cart: CartStore,
    toasts: ToastStore,
}

impl AppState {
    /// Create the state with local storage backed by `config.storage_path`.
    ///
    /// The cart starts empty; call [`CartStore::load`] on [`AppState::cart`]
    /// to fetch it.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storage = Arc::new(FileStore::new(config.storage_path.clone()));
        Self::with_storage(config, storage)
    }

    /// Create the state over an explicit storage backend.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let client = RetailClient::from_config(&config);
        let cart = CartStore::new(client.clone(), storage);
        let toasts = ToastStore::new(config.toast_duration);
        set_sentry_user(cart.user_id());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                cart,
                toasts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the retail API client.
    #[must_use]
    pub fn client(&self) -> &RetailClient {
        &self.inner.client
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastStore {
        &self.inner.toasts
    }
}
