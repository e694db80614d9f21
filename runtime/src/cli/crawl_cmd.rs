// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shelfscan crawl`: crawl every configured category and write the catalog.

use crate::catalog::{write_catalog, Catalog};
use crate::cli::output::{self, Styled};
use crate::config::{load_categories, CategorySet, CrawlConfig};
use crate::debug::DebugCapture;
use crate::orchestrator::Orchestrator;
use crate::progress::{self, Progress};
use crate::renderer::chromium::{find_chromium, ChromiumRenderer};
use crate::renderer::http::HttpRenderer;
use crate::renderer::Renderer;
use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The catalog holds at least one product.
    Wrote { count: usize },
    /// The run finished but found nothing; an empty catalog was written.
    NoProducts,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Wrote { .. } => 0,
            RunOutcome::NoProducts => 2,
        }
    }
}

/// Load configuration, pick a renderer and run the pipeline.
pub async fn run(config: CrawlConfig) -> Result<RunOutcome> {
    let categories = load_categories(&config.categories_path, config.base_url.as_deref())?;

    let renderer: Box<dyn Renderer> = if config.http_only {
        Box::new(HttpRenderer::new())
    } else if find_chromium().is_none() {
        warn!("Chromium not found, falling back to plain HTTP (no script execution)");
        Box::new(HttpRenderer::new())
    } else {
        Box::new(ChromiumRenderer::new().await?)
    };
    info!("rendering with {}", renderer.name());

    let (tx, rx) = progress::channel();
    let reporter = output::spawn_reporter(rx);

    let progress = Progress::new(Some(tx));
    let result = run_with_renderer(renderer.as_ref(), &categories, &config, progress).await;

    if let Err(e) = renderer.shutdown().await {
        warn!("renderer shutdown failed: {e:#}");
    }
    let _ = reporter.await;

    let outcome = result?;
    report(&config, outcome);
    Ok(outcome)
}

/// Crawl `categories` with an already running renderer and write the output
/// file. The renderer is left running.
pub async fn run_with_renderer(
    renderer: &dyn Renderer,
    categories: &CategorySet,
    config: &CrawlConfig,
    progress: Progress,
) -> Result<RunOutcome> {
    let debug = if config.debug_capture {
        DebugCapture::new(&config.debug_dir)
    } else {
        DebugCapture::disabled()
    };

    let result = {
        let mut orchestrator =
            Orchestrator::new(config.crawl.clone(), debug).with_progress(progress);
        orchestrator.run(renderer, &categories.tasks).await?
    };
    if result.failed_categories() > 0 {
        warn!(
            "{} of {} categories failed",
            result.failed_categories(),
            result.categories.len()
        );
    }

    let catalog = Catalog::assemble(categories.source.clone(), result.products, Utc::now());
    write_catalog(&config.output, &catalog)?;

    Ok(if catalog.is_empty() {
        RunOutcome::NoProducts
    } else {
        RunOutcome::Wrote {
            count: catalog.count,
        }
    })
}

fn report(config: &CrawlConfig, outcome: RunOutcome) {
    let s = Styled::new();
    match outcome {
        RunOutcome::Wrote { count } => {
            if !output::is_quiet() {
                println!(
                    "{} Wrote {} with {count} products",
                    s.ok_sym(),
                    config.output.display()
                );
            }
        }
        RunOutcome::NoProducts => {
            eprintln!(
                "{} No products found. See debug artifacts ({}/**)",
                s.err_sym(),
                config.debug_dir.display()
            );
        }
    }
}
