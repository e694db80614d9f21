// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Structured-metadata mining from embedded JSON-LD blocks.
//!
//! Every `<script type="application/ld+json">` block is parsed on its own; a
//! malformed block is skipped without affecting its siblings.

use super::json_walker;
use super::{Strategy, StrategyKind};
use crate::model::Product;
use crate::renderer::PageSnapshot;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

/// schema.org types that carry a name plus url/image but never describe a
/// product.
const NON_PRODUCT_TYPES: &[&str] = &[
    "WebSite",
    "WebPage",
    "CollectionPage",
    "SearchResultsPage",
    "Organization",
    "OnlineStore",
    "Store",
    "LocalBusiness",
    "Brand",
    "BreadcrumbList",
    "SearchAction",
    "SiteNavigationElement",
    "ImageObject",
    "Person",
    "Offer",
    "AggregateOffer",
];

/// Mines schema.org product markup embedded as JSON-LD.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredDataStrategy;

impl Strategy for StructuredDataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredData
    }

    fn extract(&self, page: &PageSnapshot) -> Vec<Product> {
        jsonld_blocks(&page.html)
            .iter()
            .flat_map(|block| json_walker::mine(block, is_product_node))
            .filter_map(|c| c.normalize(&page.url))
            .collect()
    }
}

/// Parse every JSON-LD block in the document, skipping malformed ones.
pub fn jsonld_blocks(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let sel = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let mut blocks = Vec::new();
    for element in document.select(&sel) {
        let text = element.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => blocks.push(value),
            Err(e) => debug!("skipping malformed JSON-LD block: {e}"),
        }
    }
    blocks
}

/// Product-shaped and not a known non-product type. A named `Product` node
/// qualifies even when its price only lives under `offers`.
fn is_product_node(obj: &Map<String, Value>) -> bool {
    let types = schema_types(obj);
    let excluded =
        !types.is_empty() && types.iter().all(|t| NON_PRODUCT_TYPES.contains(t));
    if excluded {
        return false;
    }
    let declared_product = types
        .iter()
        .any(|t| matches!(*t, "Product" | "ProductGroup" | "IndividualProduct"));
    json_walker::looks_like_product(obj)
        || (declared_product && json_walker::extract_candidate(obj).is_some())
}

/// `@type` values with any `https://schema.org/` prefix stripped.
fn schema_types(obj: &Map<String, Value>) -> Vec<&str> {
    match obj.get("@type") {
        Some(Value::String(t)) => vec![strip_schema_prefix(t)],
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .map(strip_schema_prefix)
            .collect(),
        _ => Vec::new(),
    }
}

fn strip_schema_prefix(t: &str) -> &str {
    t.rsplit('/').next().unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://shop.example/collections/necklaces";

    #[test]
    fn test_extract_item_list_products() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "WebSite",
         "name": "Shop", "url": "https://shop.example"}
        </script>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "ItemList",
          "itemListElement": [
            {"@type": "ListItem", "position": 1, "item": {
              "@type": "Product", "name": "Locket", "sku": "LK-1",
              "image": ["/img/locket.jpg"],
              "offers": {"@type": "Offer", "price": "59.00",
                         "availability": "https://schema.org/InStock"}
            }},
            {"@type": "ListItem", "position": 2, "item": {
              "@type": "Product", "name": "Choker", "url": "/products/choker",
              "offers": {"@type": "Offer", "price": 35,
                         "availability": "https://schema.org/OutOfStock"}
            }}
          ]
        }
        </script>
        </head><body></body></html>
        "#;

        let products = StructuredDataStrategy.extract(&PageSnapshot::new(PAGE, html));
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "LK-1");
        assert_eq!(products[0].price, Some(59.0));
        assert_eq!(products[0].image, "https://shop.example/img/locket.jpg");
        assert_eq!(products[0].url, PAGE);
        assert!(products[0].available);
        assert_eq!(products[1].id, "choker");
        assert!(!products[1].available);
    }

    #[test]
    fn test_graph_array_and_malformed_sibling() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">{not valid json}</script>
        <script type="application/ld+json">
        {"@graph": [
          {"@type": "Organization", "name": "Shop Inc", "logo": "/logo.png",
           "url": "https://shop.example"},
          {"@type": "Product", "name": "Anklet", "offers": {"price": 15}}
        ]}
        </script>
        </head><body></body></html>
        "#;

        let products = StructuredDataStrategy.extract(&PageSnapshot::new(PAGE, html));
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Anklet");
        assert_eq!(products[0].price, Some(15.0));
    }

    #[test]
    fn test_no_jsonld_yields_nothing() {
        let html = "<html><body><div class=\"product-card\"><h3>Ring</h3></div></body></html>";
        assert!(StructuredDataStrategy
            .extract(&PageSnapshot::new(PAGE, html))
            .is_empty());
    }

    #[test]
    fn test_type_exclusion() {
        let site = serde_json::json!({"@type": "WebSite", "name": "S", "url": "/"});
        let mixed = serde_json::json!({"@type": ["Product", "Offer"], "name": "P", "url": "/p"});
        let full = serde_json::json!({
            "@type": "https://schema.org/Organization",
            "name": "O",
            "url": "/"
        });
        assert!(!is_product_node(site.as_object().unwrap()));
        assert!(is_product_node(mixed.as_object().unwrap()));
        assert!(!is_product_node(full.as_object().unwrap()));
    }
}
