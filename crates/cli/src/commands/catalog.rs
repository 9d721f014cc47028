//! Catalog commands: search, category listings, product pages and filters.

use shopfront_core::{ProductId, SearchParams};
use shopfront_storefront::api::FilterList;
use shopfront_storefront::components::header::search_target;
use shopfront_storefront::components::{CardView, DropdownKey, SearchableDropdown};
use shopfront_storefront::pages::{ProductPage, ProductsPage};
use shopfront_storefront::{AppError, AppState};

/// Run a search and print the results.
///
/// # Errors
///
/// Returns an error if the search request fails.
pub async fn search(state: &AppState, params: SearchParams) -> Result<(), AppError> {
    let page = ProductsPage::search(state.client(), params).await?;
    print_results(&page);
    Ok(())
}

/// Print a category listing. `route` is `cat`, `sub` or `use`.
///
/// # Errors
///
/// Returns an error if the category request fails.
pub async fn category(state: &AppState, route: &str, value: &str) -> Result<(), AppError> {
    let page = ProductsPage::category(state.client(), route, value).await?;
    print_results(&page);
    Ok(())
}

/// Print a product page.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn product(state: &AppState, id: &str) -> Result<(), AppError> {
    let page = ProductPage::load(state.client(), &ProductId::new(id)).await?;
    let detail = page.detail();

    println!("{}", page.breadcrumbs().join(" / "));
    println!("{}", detail.name.as_deref().unwrap_or_default());
    if let Some(price) = &detail.price {
        println!("{price}");
    }
    let description = detail.description_text();
    if !description.is_empty() {
        println!();
        println!("{description}");
    }

    print_cards("Similar products", &page.related_cards());
    print_cards("Customers also bought", &page.also_bought_cards());
    Ok(())
}

/// Print the values of a filter list.
///
/// # Errors
///
/// Returns an error if the list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn filters(state: &AppState, list: FilterList) -> Result<(), AppError> {
    for value in state.client().filter_options(list).await? {
        println!("{value}");
    }
    Ok(())
}

/// Type `text` into a brand picker and print the open list.
///
/// With `select`, Enter commits the highlighted brand and the search link for
/// it is printed.
///
/// # Errors
///
/// Returns an error if the brand list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn brands(state: &AppState, text: &str, select: bool) -> Result<(), AppError> {
    let options = state.client().brand_names().await?;
    let mut picker = SearchableDropdown::new(options, "").with_label("Brand Name");
    picker.focus();
    let mut committed = picker.input(text);

    if let Some(message) = picker.no_options_message() {
        println!("{message}");
        return Ok(());
    }
    for option in picker.option_views() {
        let marker = if option.highlighted { ">" } else { " " };
        println!("{marker} {}", option.label);
    }

    if select {
        committed = picker.key_down(DropdownKey::Enter).or(committed);
        if let Some(brand) = committed.filter(|b| !b.is_empty()) {
            let params = SearchParams {
                brand_name: Some(brand.clone()),
                ..SearchParams::default()
            };
            println!();
            println!("{brand}: {}", search_target(&params));
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_results(page: &ProductsPage) {
    for line in page.meta() {
        println!("{line}");
    }
    println!();
    for card in page.cards() {
        println!("{card}");
    }
}

#[allow(clippy::print_stdout)]
fn print_cards(heading: &str, cards: &[CardView<'_>]) {
    if cards.is_empty() {
        return;
    }
    println!();
    println!("{heading}:");
    for card in cards {
        println!("  {card}");
    }
}
