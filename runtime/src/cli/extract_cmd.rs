// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shelfscan extract <html-file>`: run the strategy chain over a saved page.

use crate::cli::output;
use crate::extraction::{ChainOutcome, StrategyChain};
use crate::renderer::PageSnapshot;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Build the snapshot a live navigation would have produced.
pub fn load_snapshot(html_file: &Path, url: &str, responses: &[PathBuf]) -> Result<PageSnapshot> {
    let html = std::fs::read_to_string(html_file)
        .with_context(|| format!("failed to read {}", html_file.display()))?;

    let mut bodies = Vec::with_capacity(responses.len());
    for path in responses {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        bodies.push(value);
    }

    Ok(PageSnapshot::new(url, html).with_responses(bodies))
}

pub fn extract(snapshot: &PageSnapshot) -> ChainOutcome {
    StrategyChain::standard().run(snapshot)
}

pub async fn run(html_file: &Path, url: &str, responses: &[PathBuf]) -> Result<()> {
    let snapshot = load_snapshot(html_file, url, responses)?;
    let outcome = extract(&snapshot);

    if !output::is_quiet() {
        eprintln!(
            "{} products via {}",
            outcome.products.len(),
            outcome
                .strategy
                .map(|k| k.to_string())
                .unwrap_or_else(|| "no strategy".to_string())
        );
    }
    output::print_json(&json!({
        "strategy": outcome.strategy,
        "count": outcome.products.len(),
        "products": outcome.products,
    }));
    Ok(())
}
