//! Catalog types returned by the retail backend.
//!
//! Product records are loosely structured JSON documents. Only `id` is
//! guaranteed; every other field may be absent, so they are optional here and
//! unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Resolution key used for thumbnails (cart lines, small cards).
pub const THUMBNAIL_RESOLUTION: &str = "125X161";

/// Resolution key used for regular product cards.
pub const CARD_RESOLUTION: &str = "180X240";

/// Deserialize an explicit `null` as the type's default.
///
/// The backend serializes absent collections as `null` rather than omitting them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named set of product images keyed by resolution (e.g. `"125X161"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    /// Image URL per resolution key.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolutions: BTreeMap<String, String>,
}

/// A named block of product copy (HTML).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// HTML fragment.
    #[serde(default)]
    pub value: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Brand name.
    #[serde(default)]
    pub brand_name: Option<String>,
    /// Price (cents when numeric).
    #[serde(default)]
    pub price: Option<Price>,
    /// Sale price (cents when numeric).
    #[serde(default)]
    pub sale_price: Option<Price>,
    /// Top-level category (e.g. "Footwear").
    #[serde(default)]
    pub category: Option<String>,
    /// Sub-category (e.g. "Shoes").
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Article type (e.g. "Sports Shoes").
    #[serde(default)]
    pub article_type: Option<String>,
    /// Usage (e.g. "Casual").
    #[serde(default)]
    pub usage: Option<String>,
    /// Target gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Season.
    #[serde(default)]
    pub season: Option<String>,
    /// Base colours.
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
    /// Image sets keyed by name (`search`, `front`, `back`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: BTreeMap<String, ImageSet>,
    /// Copy blocks keyed by name (`description`, `style_note`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptors: BTreeMap<String, Descriptor>,
    /// Size options.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<serde_json::Value>,
    /// Style (colour variant) options.
    #[serde(default)]
    pub styles: Option<serde_json::Value>,
    /// Flattened thumbnail URL present on some search results.
    #[serde(default, rename = "image_125X161")]
    pub image_125x161: Option<String>,
    /// Flattened card image URL present on some search results.
    #[serde(default, rename = "image_180X240")]
    pub image_180x240: Option<String>,
}

impl Product {
    /// Create a product with only an ID set.
    #[must_use]
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            brand_name: None,
            price: None,
            sale_price: None,
            category: None,
            sub_category: None,
            article_type: None,
            usage: None,
            gender: None,
            season: None,
            colors: Vec::new(),
            images: BTreeMap::new(),
            descriptors: BTreeMap::new(),
            options: Vec::new(),
            styles: None,
            image_125x161: None,
            image_180x240: None,
        }
    }

    /// Look up an image URL by set name and resolution.
    #[must_use]
    pub fn image(&self, set: &str, resolution: &str) -> Option<&str> {
        self.images
            .get(set)
            .and_then(|s| s.resolutions.get(resolution))
            .map(String::as_str)
    }

    /// Thumbnail used for cart lines: the `search` image, else the `front` image.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.image("search", THUMBNAIL_RESOLUTION)
            .or_else(|| self.image("front", THUMBNAIL_RESOLUTION))
    }

    /// HTML value of a named descriptor.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&str> {
        self.descriptors
            .get(name)
            .and_then(|d| d.value.as_deref())
    }
}

/// Response body of a product lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// The product.
    pub product: Product,
    /// Similar products (may be empty).
    #[serde(default, deserialize_with = "null_as_default")]
    pub related: Vec<Product>,
    /// Frequently bought together (may be empty).
    #[serde(default, deserialize_with = "null_as_default")]
    pub also_bought: Vec<Product>,
}

/// Result page of a search or category query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    /// Matching products (the backend caps the page size).
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    /// Backend query time in milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
}

/// Search filters.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query.
    pub q: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Article type filter.
    pub article_type: Option<String>,
    /// Usage filter.
    pub usage: Option<String>,
    /// Brand filter.
    pub brand_name: Option<String>,
}

impl SearchParams {
    /// Parse filters from URL query pairs, ignoring unknown keys.
    pub fn from_query_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "q" => &mut params.q,
                "category" => &mut params.category,
                "articleType" => &mut params.article_type,
                "usage" => &mut params.usage,
                "brandName" => &mut params.brand_name,
                _ => continue,
            };
            let value = value.into();
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
        params
    }

    /// Non-empty filters as `(key, value)` query pairs, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("q", self.q.as_deref()),
            ("category", self.category.as_deref()),
            ("articleType", self.article_type.as_deref()),
            ("usage", self.usage.as_deref()),
            ("brandName", self.brand_name.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }

    /// Whether no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Secondary index used by category listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryIndex {
    /// `cat` routes: top-level category.
    Category,
    /// `sub` routes: sub-category.
    SubCategory,
    /// `use` routes: usage.
    Usage,
    /// Unrecognised route segment.
    Unknown,
}

impl CategoryIndex {
    /// Map a route short name (`cat`, `sub`, `use`) to an index.
    #[must_use]
    pub fn from_route(segment: &str) -> Self {
        match segment {
            "cat" => Self::Category,
            "sub" => Self::SubCategory,
            "use" => Self::Usage,
            _ => Self::Unknown,
        }
    }

    /// Index name understood by the backend (`idx` query parameter).
    #[must_use]
    pub const fn as_index(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::SubCategory => "subCategory",
            Self::Usage => "usage",
            Self::Unknown => "",
        }
    }
}
