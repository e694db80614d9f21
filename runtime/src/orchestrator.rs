// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crawl orchestrator: runs every category against one rendering session.
//!
//! Categories are processed strictly in configuration order. A failing
//! category is logged, reported and captured for debugging; the remaining
//! categories still run.

use crate::crawler::{CategoryCrawler, CrawlOptions};
use crate::debug::DebugCapture;
use crate::extraction::StrategyChain;
use crate::model::{CategoryReport, CategoryTask, CrawlResult};
use crate::progress::{Progress, ProgressEventKind};
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

pub struct Orchestrator {
    chain: StrategyChain,
    options: CrawlOptions,
    debug: DebugCapture,
    progress: Progress,
}

impl Orchestrator {
    pub fn new(options: CrawlOptions, debug: DebugCapture) -> Self {
        Self {
            chain: StrategyChain::standard(),
            options,
            debug,
            progress: Progress::disabled(),
        }
    }

    pub fn with_chain(mut self, chain: StrategyChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Crawl all `tasks` in order.
    ///
    /// Only a failure to open the rendering session is returned as an error;
    /// per-category failures end up in the report of that category. The
    /// session is closed before returning.
    pub async fn run(
        &mut self,
        renderer: &dyn Renderer,
        tasks: &[CategoryTask],
    ) -> Result<CrawlResult> {
        let mut ctx = renderer
            .new_context()
            .await
            .with_context(|| format!("failed to open a {} session", renderer.name()))?;

        let mut result = CrawlResult::new();
        let crawler = CategoryCrawler::new(&self.chain, &self.options, &self.debug);

        for task in tasks {
            debug!("Category: {} -> {}", task.name, task.url);
            self.progress.emit(ProgressEventKind::CategoryStarted {
                name: task.name.clone(),
                url: task.url.clone(),
            });

            match crawler.crawl(ctx.as_mut(), task, &mut self.progress).await {
                Ok(outcome) => {
                    let items = outcome.products.len();
                    info!(
                        "{}: {items} items from {} pages ({:?})",
                        task.name, outcome.pages, outcome.stop
                    );
                    self.progress.emit(ProgressEventKind::CategoryFinished {
                        name: task.name.clone(),
                        pages: outcome.pages,
                        items,
                    });
                    result.record(
                        CategoryReport {
                            name: task.name.clone(),
                            url: task.url.clone(),
                            pages: outcome.pages,
                            items,
                            error: None,
                        },
                        outcome.products,
                    );
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    error!("Category failed: {}: {message}", task.name);
                    self.debug.capture(ctx.as_ref(), &task.name, "error").await;
                    self.progress.emit(ProgressEventKind::CategoryFailed {
                        name: task.name.clone(),
                        error: message.clone(),
                    });
                    result.record(
                        CategoryReport {
                            name: task.name.clone(),
                            url: task.url.clone(),
                            pages: 0,
                            items: 0,
                            error: Some(message),
                        },
                        Vec::new(),
                    );
                }
            }
        }

        if let Err(e) = ctx.close().await {
            warn!("failed to close {} session: {e:#}", renderer.name());
        }
        Ok(result)
    }
}
