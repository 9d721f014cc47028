//! Product detail panel: name, price, description and the add-to-cart action.

use shopfront_core::{Product, ProductId};

use crate::filters;

/// Descriptor value the catalog uses for "not available".
const NOT_AVAILABLE: &str = "<p>NA</p>";

const FIT_HEADING: (&str, &str) = ("<p>", "<p><strong>Fit<br /></strong>");
const WASH_CARE_HEADING: (&str, &str) = ("<p>", "<p><strong>Wash care<br /></strong>");

/// Clean up a catalog HTML fragment for display.
///
/// Links become plain spans and stray line breaks are dropped. `heading`
/// replaces the first occurrence of its first element with its second.
/// Returns `None` for a missing or "not available" fragment.
#[must_use]
pub fn format_html(value: Option<&str>, heading: Option<(&str, &str)>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    if value == NOT_AVAILABLE {
        return None;
    }

    let mut html = value
        .replace("<a", "<span")
        .replace("</a>", "</span>")
        .replace("<strong><br /></strong>", "")
        .replacen("<br /><br /></span>", "</span>", 1)
        .replacen("</p><br/><br/><p>", "</p><p>", 1)
        .replacen("<br /><br /></p>", "</p>", 1);
    if let Some((from, to)) = heading {
        html = html.replacen(from, to, 1);
    }
    Some(html)
}

/// Plain-text rendering of an HTML fragment for terminals.
///
/// Paragraph and line breaks become newlines; other tags are dropped.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|ch: char| ch.is_whitespace() || ch == '/')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                let breaks = matches!(name.as_str(), "br" | "p");
                if breaks && !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ if in_tag => tag.push(c),
            _ => text.push(c),
        }
    }
    // `&amp;` after `&nbsp;` so an escaped `&amp;nbsp;` stays literal
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Display data for the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetailView {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub price: Option<String>,
    /// Description, style note, fit and wash care blocks concatenated.
    pub description_html: String,
}

impl ProductDetailView {
    #[must_use]
    pub fn new(product: &Product) -> Self {
        let blocks = [
            format_html(product.descriptor("description"), None),
            format_html(product.descriptor("style_note"), None),
            format_html(product.descriptor("size_fit_desc"), Some(FIT_HEADING)),
            format_html(
                product.descriptor("materials_care_desc"),
                Some(WASH_CARE_HEADING),
            ),
        ];

        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: filters::price(product.price.as_ref()),
            description_html: blocks.into_iter().flatten().collect(),
        }
    }

    /// Whether the add-to-cart action is offered. Only priced products can be
    /// bought.
    #[must_use]
    pub const fn can_add_to_cart(&self) -> bool {
        self.price.is_some()
    }

    /// Product and quantity the add-to-cart action adds.
    #[must_use]
    pub fn add_to_cart_request(&self) -> Option<(&ProductId, u32)> {
        self.can_add_to_cart().then_some((&self.product_id, 1))
    }

    /// Description as plain text.
    #[must_use]
    pub fn description_text(&self) -> String {
        html_to_text(&self.description_html)
    }
}
