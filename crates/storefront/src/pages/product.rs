//! Product page.

use shopfront_core::{ProductDetails, ProductId, ToastMessage};
use tracing::{instrument, warn};

use super::PageError;
use crate::api::RetailClient;
use crate::components::{CardView, ProductDetailView};
use crate::error::add_breadcrumb;
use crate::stores::{CartStore, ToastStore};

/// Loaded product page.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub details: ProductDetails,
}

impl ProductPage {
    /// Load a product.
    ///
    /// # Errors
    ///
    /// Returns `PageError::NotFound` if the product does not exist or cannot
    /// be fetched.
    #[instrument(skip(client), fields(product_id = %product_id))]
    pub async fn load(client: &RetailClient, product_id: &ProductId) -> Result<Self, PageError> {
        let details = client.get_product(product_id).await.map_err(|e| {
            warn!(error = %e, "Product page load failed");
            PageError::NotFound(product_id.to_string())
        })?;
        add_breadcrumb(
            "navigation",
            "Viewed product page",
            &[("product_id", product_id.as_str())],
        );
        Ok(Self { details })
    }

    /// Category, sub-category, usage and name, skipping missing levels.
    #[must_use]
    pub fn breadcrumbs(&self) -> Vec<&str> {
        let product = &self.details.product;
        [
            product.category.as_deref(),
            product.sub_category.as_deref(),
            product.usage.as_deref(),
            product.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    #[must_use]
    pub fn detail(&self) -> ProductDetailView {
        ProductDetailView::new(&self.details.product)
    }

    /// Whether a size picker is shown.
    #[must_use]
    pub fn has_size_options(&self) -> bool {
        self.details.product.options.len() > 1
    }

    /// Similar products as small cards.
    #[must_use]
    pub fn related_cards(&self) -> Vec<CardView<'_>> {
        self.details
            .related
            .iter()
            .map(|product| CardView::new(product, true))
            .collect()
    }

    /// Also-bought products as small cards.
    #[must_use]
    pub fn also_bought_cards(&self) -> Vec<CardView<'_>> {
        self.details
            .also_bought
            .iter()
            .map(|product| CardView::new(product, true))
            .collect()
    }

    /// Add-to-cart action. Reports the outcome as a toast and returns it.
    #[instrument(skip(self, cart, toasts), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        cart: &CartStore,
        toasts: &ToastStore,
        product_id: &ProductId,
        quantity: u32,
    ) -> ToastMessage {
        add_breadcrumb("cart", "Add to cart", &[("product_id", product_id.as_str())]);
        match cart.add_to_cart(product_id, quantity).await {
            Ok(()) => {
                let name = self.details.product.name.as_deref().unwrap_or("Item");
                toasts.show_success(format!("{name} added to cart!"), None)
            }
            Err(e) => toasts.show_error(format!("Failed to add item to cart: {e}"), None),
        }
    }
}
