// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! DOM heuristic mining: common "product card" markup patterns.
//!
//! Last resort when neither network traffic nor JSON-LD produced anything.
//! Runs over the flattened snapshot, so cards rendered inside open shadow
//! roots or same-origin iframes are matched as well.

use super::json_walker::Candidate;
use super::{Strategy, StrategyKind};
use crate::model::Product;
use crate::normalize;
use crate::renderer::PageSnapshot;
use scraper::{ElementRef, Html, Selector};

/// Card containers, matched as one selector group (document order).
const CARD_SELECTORS: &[&str] = &[
    "[data-product-id]",
    ".product-card",
    ".product",
    ".grid .card",
    "ul.products li",
    ".collection .card",
    ".product-grid .grid__item",
    ".products .product-item",
    "li.product",
    "div.product-list-item",
];

const TITLE_SELECTOR: &str = r#".product-title, h3, h2, [itemprop="name"]"#;
const PRICE_SELECTOR: &str = r#".price, .product-price, [itemprop="price"]"#;

/// Compiled selectors for card mining.
pub struct DomStrategy {
    cards: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    image: Selector,
}

impl DomStrategy {
    pub fn new() -> Self {
        Self {
            cards: Selector::parse(&CARD_SELECTORS.join(", "))
                .expect("card selectors are valid"),
            title: Selector::parse(TITLE_SELECTOR).expect("title selector is valid"),
            price: Selector::parse(PRICE_SELECTOR).expect("price selector is valid"),
            link: Selector::parse("a[href]").expect("link selector is valid"),
            image: Selector::parse("img").expect("image selector is valid"),
        }
    }

    fn card_candidate(&self, card: &ElementRef<'_>) -> Candidate {
        let title = card
            .select(&self.title)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let price_text = card
            .select(&self.price)
            .next()
            .map(|el| {
                el.value()
                    .attr("content")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(&el))
            })
            .unwrap_or_default();

        let own_href = (card.value().name() == "a")
            .then(|| card.value().attr("href"))
            .flatten();
        let href = own_href
            .or_else(|| {
                card.select(&self.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
            })
            .unwrap_or("");

        let image = card
            .select(&self.image)
            .next()
            .and_then(|img| {
                img.value()
                    .attr("src")
                    .filter(|s| !s.is_empty())
                    .or_else(|| img.value().attr("data-src"))
            })
            .unwrap_or("");

        Candidate {
            explicit_id: card.value().attr("data-product-id").map(str::to_string),
            title,
            price: normalize::parse_price(&price_text),
            url: href.to_string(),
            image: image.to_string(),
            available: normalize::detect_availability(&element_text(card)),
        }
    }
}

impl Default for DomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for DomStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dom
    }

    fn extract(&self, page: &PageSnapshot) -> Vec<Product> {
        let document = Html::parse_document(&page.html);
        document
            .select(&self.cards)
            .map(|card| self.card_candidate(&card))
            .filter_map(|c| c.normalize(&page.url))
            .collect()
    }
}

/// Visible text of an element, whitespace-collapsed.
fn element_text(el: &ElementRef<'_>) -> String {
    normalize::collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://shop.example/collections/earrings";

    fn extract(html: &str) -> Vec<Product> {
        DomStrategy::new().extract(&PageSnapshot::new(PAGE, html))
    }

    #[test]
    fn test_extract_product_cards() {
        let html = r#"
        <html><body>
        <div class="product-grid">
          <div class="product-card" data-product-id="e-100">
            <a href="/products/hoops"><img data-src="/img/hoops.jpg"></a>
            <h3 class="product-title"> Gold   Hoops </h3>
            <span class="price">$1,049.00</span>
          </div>
          <div class="product-card">
            <a href="https://shop.example/products/studs/">Studs</a>
            <img src="https://cdn.example/studs.png">
            <h2>Pearl Studs</h2>
            <span class="price">Sold Out</span>
          </div>
          <div class="product-card"><span class="price">$5</span></div>
        </div>
        </body></html>
        "#;

        let products = extract(html);
        assert_eq!(products.len(), 2);

        let hoops = &products[0];
        assert_eq!(hoops.id, "e-100");
        assert_eq!(hoops.title, "Gold Hoops");
        assert_eq!(hoops.price, Some(1049.0));
        assert_eq!(hoops.url, "https://shop.example/products/hoops");
        assert_eq!(hoops.image, "https://shop.example/img/hoops.jpg");
        assert!(hoops.available);

        let studs = &products[1];
        assert_eq!(studs.id, "studs");
        assert_eq!(studs.price, None);
        assert_eq!(studs.image, "https://cdn.example/studs.png");
        assert!(!studs.available);
    }

    #[test]
    fn test_card_without_link_falls_back_to_page_url() {
        let html = r#"
            <ul class="products"><li>
              <h3>Ear Cuff</h3><span itemprop="price" content="22.5">£22.50</span>
            </li></ul>
        "#;
        let products = extract(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].url, PAGE);
        assert_eq!(products[0].id, "Ear Cuff");
        assert_eq!(products[0].price, Some(22.5));
    }

    #[test]
    fn test_anchor_card_uses_own_href() {
        let html =
            r#"<div class="grid"><a class="card" href="/products/drop"><h3>Drop</h3></a></div>"#;
        let products = extract(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].url, "https://shop.example/products/drop");
    }

    #[test]
    fn test_cards_inside_flattened_shadow_root() {
        let html = r#"
            <product-list><div data-shelfscan-shadow="">
              <div class="product-card"><h3>Shadow Hoop</h3></div>
            </div></product-list>
        "#;
        let products = extract(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Shadow Hoop");
    }

    #[test]
    fn test_no_cards() {
        assert!(extract("<html><body><p>Nothing here</p></body></html>").is_empty());
    }
}
