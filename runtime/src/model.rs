// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types: products, category tasks and the crawl accumulator.

use serde::{Deserialize, Serialize};

/// A single product record as written to the output catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Deduplication key. Never empty for a kept record.
    pub id: String,
    /// Trimmed, whitespace-collapsed product title.
    pub title: String,
    /// Parsed price, `null` when the source text had no usable number.
    pub price: Option<f64>,
    /// Absolute product URL (falls back to the listing page URL).
    pub url: String,
    /// Absolute image URL or empty.
    pub image: String,
    /// False only when an out-of-stock signal matched.
    pub available: bool,
    /// Name of the listing the record was collected from. Empty until the
    /// crawler tags it.
    pub category: String,
}

/// A crawl root for one category: `(name, url)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTask {
    pub name: String,
    pub url: String,
}

impl CategoryTask {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Summary of one category's crawl, kept alongside the products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub name: String,
    pub url: String,
    /// Pages successfully navigated.
    pub pages: u32,
    /// Records appended before cross-category deduplication.
    pub items: usize,
    /// Error message when the category failed as a whole.
    pub error: Option<String>,
}

impl CategoryReport {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Process-scoped accumulator owned by the orchestrator.
///
/// Products are kept in append order; deduplication happens later in
/// [`crate::catalog::Catalog::assemble`].
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub products: Vec<Product>,
    pub categories: Vec<CategoryReport>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one category's products and its report.
    pub fn record(&mut self, report: CategoryReport, products: Vec<Product>) {
        self.products.extend(products);
        self.categories.push(report);
    }

    pub fn failed_categories(&self) -> usize {
        self.categories.iter().filter(|c| c.failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Item {id}"),
            price: Some(1.0),
            url: format!("https://shop.example/p/{id}"),
            image: String::new(),
            available: true,
            category: "Rings".to_string(),
        }
    }

    #[test]
    fn test_product_serializes_exact_fields() {
        let mut p = product("a1");
        p.price = None;
        let json = serde_json::to_value(&p).unwrap();
        let obj = json.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            ["id", "title", "price", "url", "image", "available", "category"]
        );
        assert!(obj["price"].is_null());
    }

    #[test]
    fn test_crawl_result_record_appends_in_order() {
        let mut result = CrawlResult::new();
        result.record(
            CategoryReport {
                name: "A".into(),
                url: "https://shop.example/a".into(),
                pages: 0,
                items: 0,
                error: Some("boom".into()),
            },
            Vec::new(),
        );
        result.record(
            CategoryReport {
                name: "B".into(),
                url: "https://shop.example/b".into(),
                pages: 1,
                items: 2,
                error: None,
            },
            vec![product("1"), product("2")],
        );
        assert_eq!(result.products.len(), 2);
        assert_eq!(result.products[0].id, "1");
        assert_eq!(result.failed_categories(), 1);
    }
}
