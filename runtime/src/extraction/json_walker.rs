// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Generic "looks like a product" walk over arbitrary JSON.
//!
//! Both JSON strategies (captured network responses and embedded JSON-LD)
//! run the same recursive walk; they differ only in the predicate deciding
//! which objects qualify.

use crate::model::Product;
use crate::normalize;
use serde_json::{Map, Value};

const NAME_KEYS: &[&str] = &["name", "title"];
const IMAGE_KEYS: &[&str] = &["image", "img", "thumbnailUrl", "thumb", "mainImage"];
const PRICE_KEYS: &[&str] = &["price", "priceValue", "amount"];
const LINK_KEYS: &[&str] = &["url", "link", "href"];
const ID_KEYS: &[&str] = &["id", "sku", "productId"];

/// A product proposed by a strategy, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub explicit_id: Option<String>,
    pub title: String,
    pub price: Option<f64>,
    pub url: String,
    pub image: String,
    pub available: bool,
}

impl Candidate {
    /// Key used to collapse repeats within one extraction call.
    pub fn local_key(&self) -> String {
        match &self.explicit_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => format!("{}|{}", self.title, self.url),
        }
    }

    /// Resolve URLs against `page_url`, derive the identity and produce a
    /// product. Returns `None` when the title is empty.
    pub fn normalize(&self, page_url: &str) -> Option<Product> {
        let title = normalize::collapse_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }

        let link = if self.url.trim().is_empty() {
            None
        } else {
            Some(normalize::resolve(&self.url, page_url))
        };
        let id = normalize::derive_id(
            self.explicit_id.as_deref(),
            link.as_deref().unwrap_or(""),
            &title,
        );
        let image = if self.image.trim().is_empty() {
            String::new()
        } else {
            normalize::resolve(&self.image, page_url)
        };

        Some(Product {
            id,
            title,
            price: self.price.filter(|p| p.is_finite() && *p >= 0.0),
            url: link.unwrap_or_else(|| page_url.to_string()),
            image,
            available: self.available,
            category: String::new(),
        })
    }
}

/// Visit every object in `value`, depth first, parents before children.
pub fn walk_objects<'a, F>(value: &'a Value, visit: &mut F)
where
    F: FnMut(&'a Map<String, Value>),
{
    match value {
        Value::Array(items) => {
            for item in items {
                walk_objects(item, visit);
            }
        }
        Value::Object(map) => {
            visit(map);
            for child in map.values() {
                walk_objects(child, visit);
            }
        }
        _ => {}
    }
}

/// Collect candidates from every object accepted by `predicate`.
///
/// Matching objects are still descended into, so nested variants are
/// collected alongside their parent.
pub fn mine<P>(value: &Value, predicate: P) -> Vec<Candidate>
where
    P: Fn(&Map<String, Value>) -> bool,
{
    let mut out = Vec::new();
    walk_objects(value, &mut |obj| {
        if predicate(obj) {
            if let Some(candidate) = extract_candidate(obj) {
                out.push(candidate);
            }
        }
    });
    out
}

/// The base predicate: a name/title plus at least one of image, price or link.
pub fn looks_like_product(obj: &Map<String, Value>) -> bool {
    let has_name = NAME_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .any(|v| v.as_str().map(|s| !s.trim().is_empty()).unwrap_or(false));
    has_name
        && (any_truthy(obj, IMAGE_KEYS)
            || any_truthy(obj, PRICE_KEYS)
            || any_truthy(obj, LINK_KEYS))
}

fn any_truthy(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().filter_map(|k| obj.get(*k)).any(truthy)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Pull candidate fields out of a product-shaped object.
pub fn extract_candidate(obj: &Map<String, Value>) -> Option<Candidate> {
    let title = NAME_KEYS
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())?
        .to_string();

    let explicit_id = ID_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(scalar_string);

    let url = LINK_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string();

    let image = IMAGE_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(image_url)
        .unwrap_or_default();

    let price = PRICE_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(price_value)
        .or_else(|| offer(obj).and_then(offer_price));

    Some(Candidate {
        explicit_id,
        title,
        price,
        url,
        image,
        available: availability(obj),
    })
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn image_url(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(map) => ["url", "src", "contentUrl"]
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string)),
        _ => None,
    }
}

fn price_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite() && *f >= 0.0),
        Value::String(s) => normalize::parse_price(s),
        Value::Object(map) => ["amount", "value"]
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(price_value),
        _ => None,
    }
}

fn offer(obj: &Map<String, Value>) -> Option<&Map<String, Value>> {
    match obj.get("offers")? {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.iter().find_map(Value::as_object),
        _ => None,
    }
}

fn offer_price(offer: &Map<String, Value>) -> Option<f64> {
    ["price", "lowPrice"]
        .iter()
        .filter_map(|k| offer.get(*k))
        .find_map(price_value)
}

fn availability(obj: &Map<String, Value>) -> bool {
    if let Some(flag) = obj.get("available").and_then(Value::as_bool) {
        return flag;
    }
    if let Some(status) = offer(obj)
        .and_then(|o| o.get("availability"))
        .and_then(Value::as_str)
    {
        let status = status.to_lowercase();
        if status.contains("outofstock") || status.contains("soldout") {
            return false;
        }
    }
    let subtree = serde_json::to_string(obj).unwrap_or_default();
    normalize::detect_availability(&subtree)
}
