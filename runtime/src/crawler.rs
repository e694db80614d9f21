// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Category crawler: walks one paginated listing until it runs out of pages.
//!
//! Each iteration navigates, runs the strategy chain, tags the results with
//! the category name and looks for a next-page control. The loop ends when
//! there is no usable control, the next URL was already visited, the page
//! limit is reached or a later page fails to load.

use crate::debug::DebugCapture;
use crate::extraction::pagination;
use crate::extraction::StrategyChain;
use crate::model::{CategoryTask, Product};
use crate::progress::{Progress, ProgressEventKind};
use crate::renderer::{NavigateOptions, RenderContext};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Knobs for a category crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub navigate: NavigateOptions,
    /// Fixed pause between consecutive listing pages.
    pub page_delay_ms: u64,
    /// Stop after this many pages per category.
    pub max_pages: Option<u32>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            navigate: NavigateOptions::default(),
            page_delay_ms: 400,
            max_pages: None,
        }
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No usable next-page control on the last page.
    NoNextControl,
    /// The next control pointed at a page already visited.
    Cycle,
    /// The configured page limit was reached.
    PageLimit,
    /// A page after the first failed to load.
    NavigationFailed,
}

/// Everything one category contributed.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub products: Vec<Product>,
    /// Pages successfully navigated.
    pub pages: u32,
    pub stop: StopReason,
}

pub struct CategoryCrawler<'a> {
    chain: &'a StrategyChain,
    options: &'a CrawlOptions,
    debug: &'a DebugCapture,
}

impl<'a> CategoryCrawler<'a> {
    pub fn new(
        chain: &'a StrategyChain,
        options: &'a CrawlOptions,
        debug: &'a DebugCapture,
    ) -> Self {
        Self {
            chain,
            options,
            debug,
        }
    }

    /// Crawl `task` to completion.
    ///
    /// A failure to load the first page is returned as an error. Failures on
    /// later pages end pagination and keep what was collected.
    pub async fn crawl(
        &self,
        ctx: &mut dyn RenderContext,
        task: &CategoryTask,
        progress: &mut Progress,
    ) -> Result<CategoryOutcome> {
        let mut products = Vec::new();
        let mut visited = HashSet::new();
        let mut url = task.url.clone();
        let mut pages = 0u32;

        let stop = loop {
            visited.insert(url.clone());

            let snapshot = match ctx.navigate(&url, &self.options.navigate).await {
                Ok(snapshot) => snapshot,
                Err(e) if pages == 0 => {
                    return Err(e).with_context(|| format!("failed to load {url}"));
                }
                Err(e) => {
                    warn!("{}: page {} at {url} failed: {e:#}", task.name, pages + 1);
                    progress.warn(format!(
                        "{}: stopped at page {}: {e:#}",
                        task.name,
                        pages + 1
                    ));
                    break StopReason::NavigationFailed;
                }
            };
            pages += 1;
            // Redirects land on a different URL; remember both.
            visited.insert(snapshot.url.clone());

            let outcome = self.chain.run(&snapshot);
            let found = outcome.products.len();
            debug!(
                "{} page {pages}: {found} items via {} in {}ms",
                task.name,
                outcome
                    .strategy
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                snapshot.load_time_ms
            );
            progress.emit(ProgressEventKind::PageExtracted {
                category: task.name.clone(),
                page: pages,
                url: snapshot.url.clone(),
                items: found,
                strategy: outcome.strategy,
                load_ms: snapshot.load_time_ms,
            });

            if found == 0 {
                self.debug
                    .capture(&*ctx, &task.name, &format!("page-{pages}"))
                    .await;
            }
            products.extend(outcome.products.into_iter().map(|mut p| {
                p.category = task.name.clone();
                p
            }));

            let Some(next) = pagination::next_page_url(&snapshot.html, &snapshot.url) else {
                break StopReason::NoNextControl;
            };
            if visited.contains(&next) {
                info!("{}: next page {next} already visited", task.name);
                break StopReason::Cycle;
            }
            if self.options.max_pages.is_some_and(|max| pages >= max) {
                break StopReason::PageLimit;
            }

            if self.options.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.options.page_delay_ms)).await;
            }
            url = next;
        };

        debug!("{}: stopped after {pages} pages ({stop:?})", task.name);
        Ok(CategoryOutcome {
            products,
            pages,
            stop,
        })
    }
}
