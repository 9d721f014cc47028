//! Cart commands.
//!
//! The cart is loaded before any of these run.

use shopfront_core::{ProductId, SearchParams};
use shopfront_storefront::components::Header;
use shopfront_storefront::pages::cart::EMPTY_MESSAGE;
use shopfront_storefront::pages::{CartPage, ProductPage};
use shopfront_storefront::{AppError, AppState};

use super::flush_toasts;

fn page(state: &AppState) -> CartPage {
    CartPage::new(state.cart().clone(), state.toasts().clone())
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show(state: &AppState) {
    let page = page(state);
    println!("{}", page.title());
    if page.is_empty() {
        println!("{EMPTY_MESSAGE}");
        return;
    }

    println!();
    for line in page.lines() {
        let brand = line.brand.as_deref().unwrap_or_default();
        println!(
            "{:<12} {brand} {}  {} x {} = {}",
            line.product_id.as_str(),
            line.name,
            line.price,
            line.quantity,
            line.line_total
        );
    }
    println!();
    println!("Total: {}", page.subtotal());
}

/// Add a product the way its product page does.
///
/// # Errors
///
/// Returns an error if the product page cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn add(state: &AppState, id: &str, quantity: u32) -> Result<(), AppError> {
    let product_id = ProductId::new(id);
    let page = ProductPage::load(state.client(), &product_id).await?;
    page.add_to_cart(state.cart(), state.toasts(), &product_id, quantity)
        .await;
    flush_toasts(state.toasts());

    let header = Header::new(state.cart().clone(), &SearchParams::default());
    if let Some(count) = header.cart_badge() {
        println!("Cart: {count} item(s)");
    }
    Ok(())
}

pub async fn update(state: &AppState, id: &str, quantity: i64) {
    page(state)
        .change_quantity(&ProductId::new(id), quantity)
        .await;
    flush_toasts(state.toasts());
}

pub async fn remove(state: &AppState, id: &str) {
    page(state).remove_item(&ProductId::new(id)).await;
    flush_toasts(state.toasts());
}

pub async fn clear(state: &AppState) {
    page(state).clear_cart().await;
    flush_toasts(state.toasts());
}
