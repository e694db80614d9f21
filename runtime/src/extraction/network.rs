// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Network-response mining: product-shaped objects in captured JSON traffic.

use super::json_walker::{self, Candidate};
use super::{Strategy, StrategyKind};
use crate::model::Product;
use crate::renderer::PageSnapshot;
use std::collections::HashSet;

/// Mines the JSON responses the page fetched while rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkStrategy;

impl Strategy for NetworkStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Network
    }

    fn extract(&self, page: &PageSnapshot) -> Vec<Product> {
        let candidates: Vec<Candidate> = page
            .json_responses
            .iter()
            .flat_map(|body| json_walker::mine(body, json_walker::looks_like_product))
            .collect();

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| seen.insert(c.local_key()))
            .filter_map(|c| c.normalize(&page.url))
            .collect()
    }
}
