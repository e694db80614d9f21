// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Next-page control discovery on a listing page.

use crate::normalize;
use scraper::{ElementRef, Html, Selector};

/// Structural next-page selectors, in priority order.
const NEXT_SELECTORS: &[&str] = &[
    r#"a[rel="next"]"#,
    r#"link[rel="next"]"#,
    ".pagination .next a",
    "a.next",
];

/// Trailing arrow glyphs accepted after a "Next" label.
const ARROWS: &[char] = &['>', '›', '»', '→', '⟶', '▶', '❯'];

/// Absolute URL of the next listing page, or `None` when there is no usable
/// control.
///
/// Structural markers (`rel="next"`, `.pagination .next`) are tried before
/// any `a`/`button` labeled "Next". Disabled controls and placeholder hrefs
/// (`#`, `javascript:`) are skipped.
pub fn next_page_url(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for raw in NEXT_SELECTORS {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        if let Some(href) = document.select(&sel).find_map(|el| usable_href(&el)) {
            return Some(normalize::resolve(href, page_url));
        }
    }

    let labeled = Selector::parse("a, button").ok()?;
    document
        .select(&labeled)
        .filter(is_next_label)
        .find_map(|el| usable_href(&el))
        .map(|href| normalize::resolve(href, page_url))
}

fn usable_href<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    if is_disabled(el) {
        return None;
    }
    let attrs = el.value();
    [attrs.attr("href"), attrs.attr("data-href")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|href| is_navigable(href))
}

fn is_disabled(el: &ElementRef<'_>) -> bool {
    let attrs = el.value();
    attrs.attr("disabled").is_some()
        || attrs
            .attr("aria-disabled")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
        || attrs.classes().any(|c| c == "disabled")
}

fn is_navigable(href: &str) -> bool {
    !href.is_empty()
        && href != "#"
        && !href.to_ascii_lowercase().starts_with("javascript:")
}

/// Visible text or `aria-label` reads "Next" or "Next page", with optional
/// trailing arrows.
fn is_next_label(el: &ElementRef<'_>) -> bool {
    let text = normalize::collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
    let aria = el.value().attr("aria-label").unwrap_or("");
    let found = [text.as_str(), aria].into_iter().any(reads_next);
    found
}

fn reads_next(label: &str) -> bool {
    let trim = |s: &str| {
        s.trim_matches(|c: char| ARROWS.contains(&c) || c.is_whitespace())
            .to_ascii_lowercase()
    };
    let label = trim(label);
    match label.strip_prefix("next") {
        Some(rest) => matches!(trim(rest).as_str(), "" | "page"),
        None => false,
    }
}
