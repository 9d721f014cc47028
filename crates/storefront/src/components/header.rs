//! Site header: search filters and the cart badge.

use shopfront_core::SearchParams;
use tracing::{error, instrument};
use url::form_urlencoded;

use super::searchable_dropdown::SearchableDropdown;
use crate::api::{ApiError, FilterList, RetailClient};
use crate::stores::CartStore;

/// Path of the search results page.
pub const SEARCH_PATH: &str = "/search";

/// Header state: filter option lists, the current filter values and the cart.
pub struct Header {
    cart: CartStore,
    pub categories: Vec<String>,
    pub article_types: Vec<String>,
    pub usage_types: Vec<String>,
    pub query: String,
    pub category: String,
    pub article_type: String,
    pub usage: String,
    /// Brand picker. Its committed value is the brand filter.
    pub brand: SearchableDropdown,
}

impl Header {
    /// Build the header with empty option lists and filters taken from `current`.
    #[must_use]
    pub fn new(cart: CartStore, current: &SearchParams) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            cart,
            categories: Vec::new(),
            article_types: Vec::new(),
            usage_types: Vec::new(),
            query: value(&current.q),
            category: value(&current.category),
            article_type: value(&current.article_type),
            usage: value(&current.usage),
            brand: SearchableDropdown::new(Vec::new(), value(&current.brand_name))
                .with_label("Brand Name"),
        }
    }

    /// Fetch the four option lists concurrently. A list that fails to load is
    /// logged and left empty.
    #[instrument(skip_all)]
    pub async fn load_options(&mut self, client: &RetailClient) {
        let (categories, article_types, usage_types, brand_names) = tokio::join!(
            client.categories(),
            client.article_types(),
            client.usage_types(),
            client.brand_names(),
        );

        self.categories = or_empty(FilterList::Categories, categories);
        self.article_types = or_empty(FilterList::ArticleTypes, article_types);
        self.usage_types = or_empty(FilterList::UsageTypes, usage_types);
        self.brand
            .set_options(or_empty(FilterList::BrandNames, brand_names));
    }

    /// Filters as they would be submitted.
    ///
    /// The free-text query is sent only when it is not blank.
    #[must_use]
    pub fn search_params(&self) -> SearchParams {
        let set = |v: &str| (!v.is_empty()).then(|| v.to_string());
        SearchParams {
            q: (!self.query.trim().is_empty()).then(|| self.query.clone()),
            category: set(&self.category),
            article_type: set(&self.article_type),
            usage: set(&self.usage),
            brand_name: set(self.brand.value()),
        }
    }

    /// Link the search form submits to.
    #[must_use]
    pub fn search_target(&self) -> String {
        search_target(&self.search_params())
    }

    /// Count shown on the cart icon; hidden when the cart is empty.
    #[must_use]
    pub fn cart_badge(&self) -> Option<u64> {
        let count = self.cart.cart_item_count();
        (count > 0).then_some(count)
    }
}

/// `/search` with the set filters as a query string.
#[must_use]
pub fn search_target(params: &SearchParams) -> String {
    let pairs = params.query_pairs();
    if pairs.is_empty() {
        return SEARCH_PATH.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{SEARCH_PATH}?{query}")
}

fn or_empty(list: FilterList, result: Result<Vec<String>, ApiError>) -> Vec<String> {
    result.unwrap_or_else(|e| {
        error!(list = list.path(), error = %e, "Failed to load filter options");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::components::searchable_dropdown::DropdownKey;
    use crate::storage::MemoryStore;

    fn header(server_uri: &str, current: &SearchParams) -> (Header, RetailClient) {
        let base = Url::parse(&format!("{server_uri}/rest/v1")).unwrap();
        let client = RetailClient::new(base, Duration::from_secs(300));
        let cart = CartStore::new(client.clone(), Arc::new(MemoryStore::new()));
        (Header::new(cart, current), client)
    }

    #[test]
    fn test_search_target() {
        assert_eq!(search_target(&SearchParams::default()), "/search");

        let params = SearchParams {
            q: Some("red shoes".to_string()),
            usage: Some("Sports".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(search_target(&params), "/search?q=red+shoes&usage=Sports");
    }

    #[test]
    fn test_blank_query_is_omitted() {
        let current = SearchParams {
            q: Some("   ".to_string()),
            brand_name: Some("Nike".to_string()),
            ..SearchParams::default()
        };
        let (header, _) = header("http://localhost:1", &current);

        assert_eq!(header.brand.display_value(), "Nike");
        assert_eq!(header.search_target(), "/search?brandName=Nike");
    }

    #[test]
    fn test_brand_selection_feeds_search() {
        let (mut header, _) = header("http://localhost:1", &SearchParams::default());
        header.brand.set_options(vec!["Puma".to_string()]);
        header.brand.focus();
        header.brand.key_down(DropdownKey::Enter);
        assert_eq!(header.search_params().brand_name.as_deref(), Some("Puma"));
    }

    #[test]
    fn test_cart_badge_hidden_when_empty() {
        let (header, _) = header("http://localhost:1", &SearchParams::default());
        assert_eq!(header.cart_badge(), None);
    }

    #[tokio::test]
    async fn test_load_options_tolerates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categories": ["Apparel", "Footwear"],
                "count": 2
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brand-names"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "brandNames": ["Nike"],
                "count": 1
            })))
            .mount(&server)
            .await;

        let (mut header, client) = header(&server.uri(), &SearchParams::default());
        header.load_options(&client).await;

        assert_eq!(header.categories, vec!["Apparel", "Footwear"]);
        assert!(header.article_types.is_empty());
        assert!(header.usage_types.is_empty());
        header.brand.focus();
        assert_eq!(header.brand.filtered_options(), vec!["Nike"]);
    }
}
