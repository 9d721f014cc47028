//! Product card shown in result grids.

use std::fmt;

use shopfront_core::{CARD_RESOLUTION, Product, THUMBNAIL_RESOLUTION};

use crate::filters;

/// Display data for one product tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    /// Link to the product page.
    pub href: String,
    pub image: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub name: Option<&'a str>,
    /// Omitted when the product has no price.
    pub price: Option<String>,
    pub small: bool,
}

impl<'a> CardView<'a> {
    /// Build a card. Small cards use the thumbnail resolution.
    #[must_use]
    pub fn new(product: &'a Product, small: bool) -> Self {
        let image = if small {
            product
                .image("search", THUMBNAIL_RESOLUTION)
                .or(product.image_125x161.as_deref())
        } else {
            product
                .image("search", CARD_RESOLUTION)
                .or(product.image_180x240.as_deref())
        };

        Self {
            href: format!("/product/{}", product.id),
            image,
            brand: product.brand_name.as_deref(),
            name: product.name.as_deref(),
            price: filters::price(product.price.as_ref()),
            small,
        }
    }
}

impl fmt::Display for CardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(brand) = self.brand {
            write!(f, "{brand} ")?;
        }
        f.write_str(self.name.unwrap_or_default())?;
        if let Some(price) = &self.price {
            write!(f, "  {price}")?;
        }
        write!(f, "  {}", self.href)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "15970",
            "name": "Navy Blue Shirt",
            "brandName": "Turtle",
            "price": 1599,
            "images": {
                "search": {"resolutions": {"180X240": "search-180.jpg"}}
            },
            "image_125X161": "flat-125.jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_card_view() {
        let product = product();
        let card = CardView::new(&product, false);
        assert_eq!(card.href, "/product/15970");
        assert_eq!(card.image, Some("search-180.jpg"));
        assert_eq!(card.price.as_deref(), Some("$15.99"));
        assert_eq!(
            card.to_string(),
            "Turtle Navy Blue Shirt  $15.99  /product/15970"
        );
    }

    #[test]
    fn test_small_card_falls_back_to_flat_image() {
        let product = product();
        let card = CardView::new(&product, true);
        assert_eq!(card.image, Some("flat-125.jpg"));
    }

    #[test]
    fn test_card_without_price() {
        let product = Product::new("7");
        let card = CardView::new(&product, false);
        assert_eq!(card.price, None);
        assert_eq!(card.image, None);
        assert_eq!(card.to_string(), "  /product/7");
    }
}
