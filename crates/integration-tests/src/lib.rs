//! Integration tests for Shopfront.
//!
//! [`FakeRetailBackend`] serves the retail REST API from memory on a wiremock
//! server. The catalog is fixed; carts are kept per user and mutated by the
//! cart endpoints the same way the real service does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Value, json};
use shopfront_storefront::StorefrontConfig;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

type Carts = Arc<Mutex<HashMap<String, Vec<Value>>>>;

/// Products served by the fake backend.
#[must_use]
pub fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": "1001",
            "name": "Navy Blue Shirt",
            "brandName": "Turtle",
            "price": 1599,
            "category": "Apparel",
            "subCategory": "Topwear",
            "articleType": "Shirts",
            "usage": "Casual",
            "images": {
                "search": {"resolutions": {
                    "125X161": "http://img/1001-125.jpg",
                    "180X240": "http://img/1001-180.jpg"
                }}
            },
            "descriptors": {
                "description": {"value": "<p>Soft cotton</p><p>Slim fit</p>"},
                "materials_care_desc": {"value": "Machine wash"}
            },
            "options": [{"size": "M"}, {"size": "L"}]
        }),
        json!({
            "id": "1002",
            "name": "Trail Runner",
            "brandName": "Nike",
            "price": 8999,
            "category": "Footwear",
            "subCategory": "Shoes",
            "articleType": "Sports Shoes",
            "usage": "Sports",
            "image_125X161": "http://img/1002-125.jpg"
        }),
        json!({
            "id": "1003",
            "name": "Canvas Tote",
            "brandName": "Nike",
            "price": "Call for price",
            "category": "Accessories",
            "subCategory": "Bags",
            "articleType": "Totes",
            "usage": "Casual"
        }),
    ]
}

fn find_product(id: &str) -> Option<Value> {
    catalog().into_iter().find(|p| p["id"] == id)
}

fn distinct(field: &str) -> Vec<String> {
    let mut values: Vec<String> = catalog()
        .iter()
        .filter_map(|p| p[field].as_str().map(str::to_string))
        .collect();
    values.sort();
    values.dedup();
    values
}

fn query(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// =============================================================================
// Catalog Responders
// =============================================================================

struct ProductResponder;

impl Respond for ProductResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = query(request, "prod").unwrap_or_default();
        let Some(product) = find_product(&id) else {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"error": "Product not found"}));
        };
        let related: Vec<Value> = catalog()
            .into_iter()
            .filter(|p| p["id"] != id && p["usage"] == product["usage"])
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "product": product,
            "related": related,
            "also_bought": []
        }))
    }
}

struct SearchResponder;

impl Respond for SearchResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let text = query(request, "q").map(|q| q.to_lowercase());
        let exact = ["category", "articleType", "usage", "brandName"]
            .into_iter()
            .filter_map(|field| query(request, field).map(|value| (field, value)))
            .collect::<Vec<_>>();

        let products: Vec<Value> = catalog()
            .into_iter()
            .filter(|p| {
                text.as_deref().is_none_or(|q| {
                    p["name"]
                        .as_str()
                        .is_some_and(|name| name.to_lowercase().contains(q))
                })
            })
            .filter(|p| exact.iter().all(|(field, value)| p[*field] == value.as_str()))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"products": products, "time": 4}))
    }
}

struct CategoryResponder;

impl Respond for CategoryResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let index = query(request, "idx").unwrap_or_default();
        let value = query(request, "filter_value").unwrap_or_default();
        let products: Vec<Value> = catalog()
            .into_iter()
            .filter(|p| p[index.as_str()] == value.as_str())
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"products": products, "time": 2}))
    }
}

// =============================================================================
// Cart Responder
// =============================================================================

#[derive(Clone, Copy)]
enum CartOp {
    Get,
    Add,
    Update,
    Remove,
    Clear,
}

struct CartResponder {
    op: CartOp,
    carts: Carts,
}

impl CartResponder {
    fn form(request: &Request) -> HashMap<String, String> {
        url::form_urlencoded::parse(&request.body)
            .into_owned()
            .collect()
    }

    fn rejected(status: u16, error: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(json!({"success": false, "error": error}))
    }

    fn apply(&self, items: &mut Vec<Value>, request: &Request) -> Result<(), ResponseTemplate> {
        match self.op {
            CartOp::Get => {}
            CartOp::Add => {
                let form = Self::form(request);
                let id = form.get("productId").cloned().unwrap_or_default();
                let quantity: u64 = form
                    .get("quantity")
                    .and_then(|q| q.parse().ok())
                    .unwrap_or(1);
                let Some(product) = find_product(&id) else {
                    return Err(Self::rejected(404, "Product not found"));
                };
                if let Some(line) = items.iter_mut().find(|l| l["productId"] == id.as_str()) {
                    let current = line["quantity"].as_u64().unwrap_or_default();
                    line["quantity"] = json!(current + quantity);
                } else {
                    items.push(json!({
                        "productId": id,
                        "name": product["name"],
                        "price": product["price"],
                        "image": product["image_125X161"],
                        "brandName": product["brandName"],
                        "quantity": quantity
                    }));
                }
            }
            CartOp::Update => {
                let form = Self::form(request);
                let id = form.get("productId").cloned().unwrap_or_default();
                let quantity: i64 = form
                    .get("quantity")
                    .and_then(|q| q.parse().ok())
                    .unwrap_or_default();
                let Some(position) = items.iter().position(|l| l["productId"] == id.as_str())
                else {
                    return Err(Self::rejected(404, "Product not in cart"));
                };
                if quantity <= 0 {
                    items.remove(position);
                } else if let Some(line) = items.get_mut(position) {
                    line["quantity"] = json!(quantity);
                }
            }
            CartOp::Remove => {
                let id = query(request, "productId").unwrap_or_default();
                items.retain(|l| l["productId"] != id.as_str());
            }
            CartOp::Clear => items.clear(),
        }
        Ok(())
    }
}

impl Respond for CartResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let user_id = request
            .url
            .path_segments()
            .and_then(|mut segments| segments.nth(3))
            .unwrap_or_default()
            .to_string();

        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let items = carts.entry(user_id).or_default();
        if let Err(response) = self.apply(items, request) {
            return response;
        }

        let total: i64 = items
            .iter()
            .filter_map(|l| Some(l["price"].as_i64()? * l["quantity"].as_i64()?))
            .sum();
        let item_count: i64 = items.iter().filter_map(|l| l["quantity"].as_i64()).sum();
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "items": items,
            "total": total,
            "itemCount": item_count
        }))
    }
}

// =============================================================================
// FakeRetailBackend
// =============================================================================

/// In-memory retail backend on a local mock server.
pub struct FakeRetailBackend {
    server: MockServer,
    carts: Carts,
}

impl FakeRetailBackend {
    /// Start a backend with the fixed catalog and no carts.
    pub async fn start() -> Self {
        let backend = Self {
            server: MockServer::start().await,
            carts: Arc::default(),
        };
        backend.mount().await;
        backend
    }

    async fn mount(&self) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/get"))
            .respond_with(ProductResponder)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/search"))
            .respond_with(SearchResponder)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/category"))
            .respond_with(CategoryResponder)
            .mount(&self.server)
            .await;

        for (route, key, field) in [
            ("categories", "categories", "category"),
            ("article-types", "articleTypes", "articleType"),
            ("usage-types", "usageTypes", "usage"),
            ("brand-names", "brandNames", "brandName"),
        ] {
            let values = distinct(field);
            let count = values.len();
            Mock::given(method("GET"))
                .and(path(format!("/rest/v1/{route}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({key: values, "count": count})),
                )
                .mount(&self.server)
                .await;
        }

        for (verb, pattern, op) in [
            ("GET", r"^/rest/v1/cart/[^/]+$", CartOp::Get),
            ("POST", r"^/rest/v1/cart/[^/]+/add$", CartOp::Add),
            ("PUT", r"^/rest/v1/cart/[^/]+/update$", CartOp::Update),
            ("DELETE", r"^/rest/v1/cart/[^/]+/remove$", CartOp::Remove),
            ("DELETE", r"^/rest/v1/cart/[^/]+/clear$", CartOp::Clear),
        ] {
            Mock::given(method(verb))
                .and(path_regex(pattern))
                .respond_with(CartResponder {
                    op,
                    carts: Arc::clone(&self.carts),
                })
                .mount(&self.server)
                .await;
        }
    }

    /// Make every endpoint answer 503 until [`FakeRetailBackend::recover`].
    pub async fn go_offline(&self) {
        self.server.reset().await;
        Mock::given(path_regex(r"^/rest/v1/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Serve the catalog and carts again. Carts keep their contents.
    pub async fn recover(&self) {
        self.server.reset().await;
        self.mount().await;
    }

    /// API base URL (`.../rest/v1`).
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("{}/rest/v1", self.server.uri()))
            .expect("mock server URI should be a valid URL")
    }

    /// Default configuration pointed at this backend.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::new(self.api_url())
    }

    /// Server-side cart lines of a user.
    #[must_use]
    pub fn server_cart(&self, user_id: &str) -> Vec<Value> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a user's server-side cart.
    pub fn set_server_cart(&self, user_id: &str, items: Vec<Value>) {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), items);
    }

    /// Number of requests received so far (since the last reset).
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}
