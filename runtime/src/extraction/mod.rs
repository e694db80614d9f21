// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Product extraction from a rendered page snapshot.
//!
//! Three strategies run in a fixed order and the first one that yields at
//! least one product wins:
//!
//! 1. [`network::NetworkStrategy`]: product-shaped objects in JSON traffic
//! 2. [`structured::StructuredDataStrategy`]: schema.org JSON-LD blocks
//! 3. [`dom::DomStrategy`]: common product-card markup
//!
//! [`pagination::next_page_url`] locates the next listing page.

pub mod dom;
pub mod json_walker;
pub mod network;
pub mod pagination;
pub mod structured;

use crate::model::Product;
use crate::renderer::PageSnapshot;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Which extraction strategy produced a page's products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Network,
    StructuredData,
    Dom,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyKind::Network => "network",
            StrategyKind::StructuredData => "json-ld",
            StrategyKind::Dom => "dom",
        };
        f.write_str(label)
    }
}

/// One way of turning a page snapshot into products.
///
/// Implementations are pure over the snapshot; they never navigate.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    /// Products found on the page, deduplicated within this call. Empty when
    /// the strategy does not apply.
    fn extract(&self, page: &PageSnapshot) -> Vec<Product>;
}

/// Result of running the chain over one page.
#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    /// The strategy that produced `products`, `None` when all came up empty.
    pub strategy: Option<StrategyKind>,
    pub products: Vec<Product>,
}

impl ChainOutcome {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Ordered, first-match-wins list of strategies.
pub struct StrategyChain {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Network, then JSON-LD, then DOM cards.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(network::NetworkStrategy),
            Box::new(structured::StructuredDataStrategy),
            Box::new(dom::DomStrategy::new()),
        ])
    }

    /// Run strategies in order, stopping at the first non-empty result.
    pub fn run(&self, page: &PageSnapshot) -> ChainOutcome {
        for strategy in &self.strategies {
            let products = strategy.extract(page);
            if !products.is_empty() {
                debug!(
                    "{} strategy found {} products on {}",
                    strategy.kind(),
                    products.len(),
                    page.url
                );
                return ChainOutcome {
                    strategy: Some(strategy.kind()),
                    products,
                };
            }
        }
        ChainOutcome::default()
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::standard()
    }
}
