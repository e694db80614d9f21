// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cross-page, cross-category deduplication and the output document.

use crate::model::Product;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// The output document: `{source, generatedAt, count, products}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Base origin of the crawled storefront.
    pub source: String,
    #[serde(with = "iso_millis")]
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub products: Vec<Product>,
}

impl Catalog {
    /// Deduplicate `products` by id, keeping the first occurrence and the
    /// original order.
    pub fn assemble(
        source: impl Into<String>,
        products: Vec<Product>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut seen = HashSet::new();
        let products: Vec<Product> = products
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        Self {
            source: source.into(),
            generated_at,
            count: products.len(),
            products,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Write `catalog` as pretty JSON, creating parent directories as needed.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
