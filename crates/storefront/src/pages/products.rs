//! Search and category result pages.

use shopfront_core::{CategoryIndex, ProductList, SearchParams};
use tracing::{debug, instrument};

use super::PageError;
use crate::api::RetailClient;
use crate::components::CardView;

/// Filters that produced a result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilters {
    /// Search filters, empty on category pages.
    pub search: SearchParams,
    /// Filter value of a category page.
    pub category_filter: Option<String>,
}

/// A page of product results.
#[derive(Debug, Clone)]
pub struct ProductsPage {
    pub results: ProductList,
    pub filters: ResultFilters,
}

impl ProductsPage {
    /// Load search results.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Api` if the search request fails.
    #[instrument(skip(client))]
    pub async fn search(client: &RetailClient, params: SearchParams) -> Result<Self, PageError> {
        let results = client.search(&params).await?;
        debug!(count = results.products.len(), "Search results loaded");
        Ok(Self {
            results,
            filters: ResultFilters {
                search: params,
                category_filter: None,
            },
        })
    }

    /// Load a category listing. `route` is the short index name (`cat`, `sub`
    /// or `use`).
    ///
    /// # Errors
    ///
    /// Returns `PageError::Api` if the category request fails.
    #[instrument(skip(client))]
    pub async fn category(
        client: &RetailClient,
        route: &str,
        filter: &str,
    ) -> Result<Self, PageError> {
        let index = CategoryIndex::from_route(route);
        let results = client.category(index, filter).await?;
        debug!(count = results.products.len(), index = index.as_index(), "Category loaded");
        Ok(Self {
            results,
            filters: ResultFilters {
                search: SearchParams::default(),
                category_filter: Some(filter.to_string()).filter(|f| !f.is_empty()),
            },
        })
    }

    /// Summary lines: one per active filter, then the query time.
    #[must_use]
    pub fn meta(&self) -> Vec<String> {
        let search = &self.filters.search;
        let labelled = [
            ("Search", &search.q),
            ("Category", &search.category),
            ("Article Type", &search.article_type),
            ("Usage", &search.usage),
            ("Brand", &search.brand_name),
        ];

        let mut lines: Vec<String> = labelled
            .into_iter()
            .filter_map(|(label, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{label}: {v}"))
            })
            .collect();
        if let Some(filter) = &self.filters.category_filter {
            lines.push(format!("Category {filter}"));
        }
        if let Some(time) = self.results.time {
            lines.push(format!("Query executed in {time}ms"));
        }
        lines
    }

    /// Result tiles.
    #[must_use]
    pub fn cards(&self) -> Vec<CardView<'_>> {
        self.results
            .products
            .iter()
            .map(|product| CardView::new(product, false))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RetailClient {
        let base = Url::parse(&format!("{}/rest/v1", server.uri())).unwrap();
        RetailClient::new(base, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_search_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/search"))
            .and(query_param("q", "watch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": "1", "name": "Chrono", "price": 12000}],
                "time": 7
            })))
            .mount(&server)
            .await;

        let params = SearchParams::from_query_pairs([("q", "watch"), ("usage", "Casual")]);
        let page = ProductsPage::search(&client_for(&server), params)
            .await
            .unwrap();

        assert_eq!(
            page.meta(),
            vec!["Search: watch", "Usage: Casual", "Query executed in 7ms"]
        );
        let cards = page.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].price.as_deref(), Some("$120.00"));
    }

    #[tokio::test]
    async fn test_category_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/category"))
            .and(query_param("idx", "usage"))
            .and(query_param("filter_value", "Sports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [],
                "time": 2
            })))
            .mount(&server)
            .await;

        let page = ProductsPage::category(&client_for(&server), "use", "Sports")
            .await
            .unwrap();
        assert_eq!(page.meta(), vec!["Category Sports", "Query executed in 2ms"]);
        assert!(page.cards().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = ProductsPage::search(&client_for(&server), SearchParams::default()).await;
        assert!(matches!(result, Err(PageError::Api(_))));
    }
}
