// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pure normalization helpers: URL resolution, price parsing, identity and
//! availability detection.
//!
//! Nothing here performs I/O or fails; malformed input degrades to the raw
//! value or `None`.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn price_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d.,]*\d[\d.,]*").expect("price regex is valid"))
}

/// Resolve a possibly-relative URL against `base`.
///
/// Returns `url` unchanged when either side is malformed.
pub fn resolve(url: &str, base: &str) -> String {
    let url = url.trim();
    match Url::parse(base) {
        Ok(base) => base
            .join(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string()),
        Err(_) => match Url::parse(url) {
            Ok(abs) => abs.to_string(),
            Err(_) => url.to_string(),
        },
    }
}

/// Scheme + host (+ port) of a URL, e.g. `https://shop.example`.
pub fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    })
}

/// Parse the first numeric-looking token of `text` as a price.
///
/// `,` is treated as a grouping separator and stripped. The longest leading
/// part of the token that reads as a number wins, so trailing punctuation
/// (`"$12.99."`) or a second dot (`"1.2.3"`) does not discard the price.
/// Returns `None` when no token is found or the result is not a finite,
/// non-negative number.
pub fn parse_price(text: &str) -> Option<f64> {
    let token = price_token_re().find(text)?.as_str();
    let cleaned = token.replace(',', "");
    let cleaned = cleaned.trim_end_matches('.');
    // The token is ASCII, so every byte index is a char boundary.
    (1..=cleaned.len())
        .rev()
        .find_map(|end| cleaned[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Derive the identity of a product.
///
/// Precedence: explicit identifier, then the last non-empty path segment of
/// `url`, then `title`.
pub fn derive_id(explicit: Option<&str>, url: &str, title: &str) -> String {
    if let Some(id) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return id.to_string();
    }
    if let Some(segment) = last_path_segment(url) {
        return segment;
    }
    title.trim().to_string()
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

/// False when the text mentions "sold out" or "out of stock" (any case).
///
/// This is a plain substring heuristic: marketing copy containing either
/// phrase also flips the flag.
pub fn detect_availability(raw_text: &str) -> bool {
    let lower = raw_text.to_lowercase();
    !(lower.contains("sold out") || lower.contains("out of stock"))
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Filesystem-safe, lower-case, hyphenated form of a category name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "category".to_string()
    } else {
        slug
    }
}
