//! Retail REST API client.
//!
//! Plain `reqwest` calls against the `/rest/v1` backend. Product lookups and
//! the four filter lists are cached with `moka`; cart calls never are.

mod cache;
mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use shopfront_core::{
    CartLineItem, CategoryIndex, ProductDetails, ProductId, ProductList, SearchParams, UserId,
};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

use cache::{CacheValue, options_key, product_key};
use types::{CartResponse, ErrorBody, ProductResponse};

/// Errors that can occur when talking to the retail backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a usable error body.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {id}: {message}")]
    NotFound { id: String, message: String },

    /// The backend answered but reported failure.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The configured base URL cannot have path segments appended.
    #[error("API base URL cannot be used as a base: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Text to show a shopper: the backend's own message when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { message, .. } | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Filter option lists served by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterList {
    Categories,
    ArticleTypes,
    UsageTypes,
    BrandNames,
}

impl FilterList {
    /// All lists, in header order.
    pub const ALL: [Self; 4] = [
        Self::Categories,
        Self::ArticleTypes,
        Self::UsageTypes,
        Self::BrandNames,
    ];

    /// Endpoint path segment.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::ArticleTypes => "article-types",
            Self::UsageTypes => "usage-types",
            Self::BrandNames => "brand-names",
        }
    }

    /// JSON field holding the list in the response body.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::ArticleTypes => "articleTypes",
            Self::UsageTypes => "usageTypes",
            Self::BrandNames => "brandNames",
        }
    }
}

// =============================================================================
// RetailClient
// =============================================================================

/// Client for the retail REST API.
///
/// Cloning is cheap; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct RetailClient {
    inner: Arc<RetailClientInner>,
}

struct RetailClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl RetailClient {
    /// Create a client for `base_url` whose catalog cache entries live for `cache_ttl`.
    #[must_use]
    pub fn new(base_url: Url, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(RetailClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Create a client from configuration.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.api_url.clone(), config.catalog_cache_ttl)
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Retail API returned non-success status"
            );
            // Cart endpoints explain 4xx/5xx failures in an `error` field
            if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str(&body) {
                return Err(ApiError::Rejected(error));
            }
            return Err(ApiError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ApiError> {
        let body = self.execute(self.inner.client.request(method, url)).await?;
        parse(&body)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a product with its related and also-bought lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the backend reports an error for the ID,
    /// or another variant if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductDetails, ApiError> {
        let cache_key = product_key(product_id.as_str());

        if let Some(CacheValue::Product(details)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*details);
        }

        let url = self.endpoint_with_query(&["get"], &[("prod", product_id.as_str())])?;
        let response: ProductResponse = self.fetch(Method::GET, url).await?;
        let details = response.into_details(product_id.as_str())?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(details.clone())))
            .await;

        Ok(details)
    }

    /// Search products by free text and filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, params: &SearchParams) -> Result<ProductList, ApiError> {
        let url = self.endpoint_with_query(&["search"], &params.query_pairs())?;
        self.fetch(Method::GET, url).await
    }

    /// List products by a secondary index.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn category(
        &self,
        index: CategoryIndex,
        filter_value: &str,
    ) -> Result<ProductList, ApiError> {
        let url = self.endpoint_with_query(
            &["category"],
            &[("idx", index.as_index()), ("filter_value", filter_value)],
        )?;
        self.fetch(Method::GET, url).await
    }

    /// Get one of the filter option lists. A missing list field reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn filter_options(&self, list: FilterList) -> Result<Vec<String>, ApiError> {
        let cache_key = options_key(list.path());

        if let Some(CacheValue::Options(options)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for filter options");
            return Ok(options);
        }

        let url = self.endpoint(&[list.path()])?;
        let mut body: serde_json::Value = self.fetch(Method::GET, url).await?;
        let options: Vec<String> = match body.get_mut(list.field()) {
            Some(value) => serde_json::from_value(value.take())?,
            None => Vec::new(),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Options(options.clone()))
            .await;

        Ok(options)
    }

    /// Get all top-level categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.filter_options(FilterList::Categories).await
    }

    /// Get all article types.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn article_types(&self) -> Result<Vec<String>, ApiError> {
        self.filter_options(FilterList::ArticleTypes).await
    }

    /// Get all usage types.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn usage_types(&self) -> Result<Vec<String>, ApiError> {
        self.filter_options(FilterList::UsageTypes).await
    }

    /// Get all brand names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn brand_names(&self) -> Result<Vec<String>, ApiError> {
        self.filter_options(FilterList::BrandNames).await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the server-side cart of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend reports failure, or
    /// the response carries no item list.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint(&["cart", user_id.as_str()])?;
        let response: CartResponse = self.fetch(Method::GET, url).await?;
        response.into_items(true)
    }

    /// Add a quantity of a product to the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint(&["cart", user_id.as_str(), "add"])?;
        let quantity = quantity.to_string();
        let request = self
            .inner
            .client
            .post(url)
            .form(&[("productId", product_id.as_str()), ("quantity", quantity.as_str())]);
        let response: CartResponse = parse(&self.execute(request).await?)?;
        response.into_items(false)
    }

    /// Set the quantity of a line in the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint(&["cart", user_id.as_str(), "update"])?;
        let quantity = quantity.to_string();
        let request = self
            .inner
            .client
            .put(url)
            .form(&[("productId", product_id.as_str()), ("quantity", quantity.as_str())]);
        let response: CartResponse = parse(&self.execute(request).await?)?;
        response.into_items(false)
    }

    /// Remove a product from the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint_with_query(
            &["cart", user_id.as_str(), "remove"],
            &[("productId", product_id.as_str())],
        )?;
        let response: CartResponse = self.fetch(Method::DELETE, url).await?;
        response.into_items(false)
    }

    /// Empty the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint(&["cart", user_id.as_str(), "clear"])?;
        let response: CartResponse = self.fetch(Method::DELETE, url).await?;
        response.into_items(false)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse retail API response"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> RetailClient {
        let base = Url::parse(&format!("{}/rest/v1", server.uri())).unwrap();
        RetailClient::new(base, Duration::from_secs(300))
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = RetailClient::new(
            Url::parse("http://shop.test/rest/v1/").unwrap(),
            Duration::from_secs(1),
        );
        let url = client.endpoint(&["cart", "user_abc", "add"]).unwrap();
        assert_eq!(url.as_str(), "http://shop.test/rest/v1/cart/user_abc/add");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = RetailClient::new(
            Url::parse("http://shop.test/rest/v1").unwrap(),
            Duration::from_secs(1),
        );
        let url = client.endpoint(&["cart", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://shop.test/rest/v1/cart/a%2Fb");
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/get"))
            .and(query_param("prod", "15970"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": null,
                "product": {"id": "15970", "name": "Navy Shirt", "price": 1599},
                "related": [{"id": "15971"}],
                "also_bought": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let id = ProductId::new("15970");
        let first = client.get_product(&id).await.unwrap();
        let second = client.get_product(&id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.product.name.as_deref(), Some("Navy Shirt"));
        assert_eq!(first.related.len(), 1);
    }

    #[tokio::test]
    async fn test_get_product_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/get"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "Product not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_product(&ProductId::new("nope")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_search_sends_only_set_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/search"))
            .and(query_param("q", "shirt"))
            .and(query_param("brandName", "Nike"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": "1"}, {"id": "2"}],
                "time": 12
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let params = SearchParams {
            q: Some("shirt".to_string()),
            brand_name: Some("Nike".to_string()),
            category: Some(String::new()),
            ..SearchParams::default()
        };
        let list = client.search(&params).await.unwrap();
        assert_eq!(list.products.len(), 2);
        assert_eq!(list.time, Some(12));

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("category"));
    }

    #[tokio::test]
    async fn test_category_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/category"))
            .and(query_param("idx", "subCategory"))
            .and(query_param("filter_value", "Topwear"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"products": [], "time": 3})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let list = client
            .category(CategoryIndex::SubCategory, "Topwear")
            .await
            .unwrap();
        assert!(list.products.is_empty());
    }

    #[tokio::test]
    async fn test_filter_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brand-names"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "brandNames": ["Adidas", "Nike"],
                "count": 2
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/usage-types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.brand_names().await.unwrap(), vec!["Adidas", "Nike"]);
        assert_eq!(client.brand_names().await.unwrap().len(), 2);
        assert!(client.usage_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_cart_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/cart/user_abc/add"))
            .and(body_string_contains("productId=P1"))
            .and(body_string_contains("quantity=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "items": [{"productId": "P1", "name": "Shirt", "price": 1599, "quantity": 2}],
                "total": 3198,
                "itemCount": 2,
                "message": "Item added to cart"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client
            .add_to_cart(&UserId::new("user_abc"), &ProductId::new("P1"), 2)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_cart_error_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/v1/cart/user_abc/update"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": "Product ID is required"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .update_cart_item(&UserId::new("user_abc"), &ProductId::new(""), 1)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request rejected: Product ID is required");
    }

    #[tokio::test]
    async fn test_server_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/cart/user_abc/clear"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.clear_cart(&UserId::new("user_abc")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_remove_uses_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/cart/user_abc/remove"))
            .and(query_param("productId", "P1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "items": []})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client
            .remove_from_cart(&UserId::new("user_abc"), &ProductId::new("P1"))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/cart/user_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_cart(&UserId::new("user_abc")).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
