// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run configuration and category-file loading.
//!
//! The category file is a JSON object mapping display names to listing URLs;
//! file order is crawl order.

use crate::crawler::CrawlOptions;
use crate::error::ConfigError;
use crate::model::CategoryTask;
use crate::normalize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_CATEGORY_FILE: &str = "category_links.json";
pub const DEFAULT_OUTPUT_FILE: &str = "products.json";
pub const DEFAULT_DEBUG_DIR: &str = "debug";

/// Name of the category synthesized when no category file exists.
pub const FALLBACK_CATEGORY: &str = "All Products";

/// Everything a `crawl` run needs.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub categories_path: PathBuf,
    pub base_url: Option<String>,
    pub output: PathBuf,
    pub debug_dir: PathBuf,
    pub debug_capture: bool,
    pub http_only: bool,
    pub crawl: CrawlOptions,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            categories_path: PathBuf::from(DEFAULT_CATEGORY_FILE),
            base_url: None,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            debug_dir: PathBuf::from(DEFAULT_DEBUG_DIR),
            debug_capture: true,
            http_only: false,
            crawl: CrawlOptions::default(),
        }
    }
}

/// Ordered crawl roots plus the origin recorded as the catalog source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    pub tasks: Vec<CategoryTask>,
    pub source: String,
}

/// Load the category file at `path`.
///
/// A missing file falls back to one [`FALLBACK_CATEGORY`] rooted at the base
/// origin, provided `base_url` is set. Relative category URLs are resolved
/// against `base_url`.
pub fn load_categories(path: &Path, base_url: Option<&str>) -> Result<CategorySet, ConfigError> {
    let base_origin = base_url
        .map(|raw| {
            normalize::origin(raw).ok_or_else(|| ConfigError::InvalidUrl {
                name: "--base-url".to_string(),
                url: raw.to_string(),
            })
        })
        .transpose()?;

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let Some(origin) = base_origin else {
                return Err(ConfigError::MissingBaseUrl(path.to_path_buf()));
            };
            warn!(
                "{} not found, crawling {origin} as \"{FALLBACK_CATEGORY}\"",
                path.display()
            );
            return Ok(CategorySet {
                tasks: vec![CategoryTask::new(FALLBACK_CATEGORY, origin.clone())],
                source: origin,
            });
        }
        Err(source) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let tasks = parse_categories(&text, base_url).map_err(|e| match e {
        ParseFailure::Malformed(reason) => ConfigError::Malformed {
            path: path.to_path_buf(),
            reason,
        },
        ParseFailure::Config(e) => e,
    })?;
    if tasks.is_empty() {
        return Err(ConfigError::NoCategories(path.to_path_buf()));
    }
    debug!("loaded {} categories from {}", tasks.len(), path.display());

    let source = match base_origin {
        Some(origin) => origin,
        None => normalize::origin(&tasks[0].url).unwrap_or_else(|| tasks[0].url.clone()),
    };
    Ok(CategorySet { tasks, source })
}

enum ParseFailure {
    Malformed(String),
    Config(ConfigError),
}

fn parse_categories(
    text: &str,
    base_url: Option<&str>,
) -> Result<Vec<CategoryTask>, ParseFailure> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseFailure::Malformed(e.to_string()))?;
    let Value::Object(entries) = value else {
        return Err(ParseFailure::Malformed("top level is not an object".to_string()));
    };

    entries
        .into_iter()
        .map(|(name, url)| {
            let Value::String(raw) = url else {
                return Err(ParseFailure::Malformed(format!(
                    "URL for {name:?} is not a string"
                )));
            };
            let resolved = match base_url {
                Some(base) => normalize::resolve(&raw, base),
                None => raw.trim().to_string(),
            };
            match Url::parse(&resolved) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {
                    Ok(CategoryTask::new(name, resolved))
                }
                _ => Err(ParseFailure::Config(ConfigError::InvalidUrl { name, url: raw })),
            }
        })
        .collect()
}
