//! End-to-end pipeline tests against a scripted in-memory renderer.
//!
//! The renderer serves canned snapshots per URL so the real orchestrator,
//! crawler, strategy chain, catalog and debug capture run unchanged.

use anyhow::{bail, Result};
use assert_json_diff::assert_json_include;
use async_trait::async_trait;
use serde_json::{json, Value};
use shelfscan_runtime::catalog::Catalog;
use shelfscan_runtime::cli::crawl_cmd::{run_with_renderer, RunOutcome};
use shelfscan_runtime::config::{CategorySet, CrawlConfig};
use shelfscan_runtime::crawler::CrawlOptions;
use shelfscan_runtime::debug::DebugCapture;
use shelfscan_runtime::extraction::{Strategy, StrategyChain, StrategyKind};
use shelfscan_runtime::model::{CategoryTask, Product};
use shelfscan_runtime::orchestrator::Orchestrator;
use shelfscan_runtime::progress::{self, Progress, ProgressEventKind};
use shelfscan_runtime::renderer::{NavigateOptions, PageSnapshot, RenderContext, Renderer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Scripted renderer ──

#[derive(Default)]
struct Script {
    pages: HashMap<String, PageSnapshot>,
    visits: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

struct ScriptedRenderer {
    script: Arc<Script>,
}

impl ScriptedRenderer {
    fn new(pages: Vec<PageSnapshot>) -> Self {
        let script = Script {
            pages: pages.into_iter().map(|p| (p.url.clone(), p)).collect(),
            ..Default::default()
        };
        Self {
            script: Arc::new(script),
        }
    }

    fn visits(&self) -> Vec<String> {
        self.script.visits.lock().unwrap().clone()
    }

    fn closes(&self) -> usize {
        self.script.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(ScriptedContext {
            script: self.script.clone(),
            current: String::new(),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedContext {
    script: Arc<Script>,
    current: String,
}

#[async_trait]
impl RenderContext for ScriptedContext {
    async fn navigate(&mut self, url: &str, _: &NavigateOptions) -> Result<PageSnapshot> {
        self.script.visits.lock().unwrap().push(url.to_string());
        let Some(page) = self.script.pages.get(url) else {
            bail!("navigation to {url} timed out after 60000ms");
        };
        self.current = page.html.clone();
        Ok(page.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG".to_vec())
    }

    async fn html(&self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.script.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Page builders ──

fn card(slug: &str, title: &str, price: &str) -> String {
    format!(
        r#"<div class="product-card">
             <a href="/products/{slug}"><img src="/img/{slug}.jpg"></a>
             <h3>{title}</h3><span class="price">{price}</span>
           </div>"#
    )
}

fn listing(url: &str, cards: &[String], next: Option<&str>) -> PageSnapshot {
    let next = next
        .map(|n| format!(r#"<nav class="pagination"><a href="{n}">Next &rarr;</a></nav>"#))
        .unwrap_or_default();
    PageSnapshot::new(url, format!("<html><body>{}{next}</body></html>", cards.concat()))
}

fn categories(tasks: &[(&str, &str)]) -> CategorySet {
    CategorySet {
        tasks: tasks.iter().map(|(n, u)| CategoryTask::new(*n, *u)).collect(),
        source: "https://shop.example".to_string(),
    }
}

fn config(tmp: &TempDir) -> CrawlConfig {
    CrawlConfig {
        output: tmp.path().join("products.json"),
        debug_dir: tmp.path().join("debug"),
        crawl: CrawlOptions {
            page_delay_ms: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn read_catalog(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ── Tests ──

#[tokio::test]
async fn test_three_page_category_terminates() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![
        listing(
            "https://shop.example/collections/rings",
            &[card("signet", "Signet", "$120.00"), card("band", "Band", "$80")],
            Some("/collections/rings?page=2"),
        ),
        listing(
            "https://shop.example/collections/rings?page=2",
            &[card("stacker", "Stacker", "$1,050.00")],
            Some("/collections/rings?page=3"),
        ),
        listing(
            "https://shop.example/collections/rings?page=3",
            &[card("opal", "Opal", "Sold out")],
            None,
        ),
    ]);
    let cfg = config(&tmp);

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[("Rings", "https://shop.example/collections/rings")]),
        &cfg,
        Progress::disabled(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::Wrote { count: 4 });
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(renderer.visits().len(), 3);
    assert_eq!(renderer.closes(), 1);

    let catalog = read_catalog(&cfg.output);
    assert_json_include!(
        actual: catalog.clone(),
        expected: json!({
            "source": "https://shop.example",
            "count": 4,
            "products": [
                {"id": "signet", "title": "Signet", "price": 120.0, "category": "Rings",
                 "url": "https://shop.example/products/signet",
                 "image": "https://shop.example/img/signet.jpg", "available": true},
                {"id": "band"},
                {"id": "stacker", "price": 1050.0},
                {"id": "opal", "price": null, "available": false}
            ]
        })
    );
    assert!(catalog["generatedAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_revisited_next_url_stops_pagination() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![
        listing(
            "https://shop.example/c",
            &[card("a", "A", "$1")],
            Some("/c?page=2"),
        ),
        listing(
            "https://shop.example/c?page=2",
            &[card("b", "B", "$2")],
            Some("/c"),
        ),
    ]);

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[("Loop", "https://shop.example/c")]),
        &config(&tmp),
        Progress::disabled(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::Wrote { count: 2 });
    assert_eq!(
        renderer.visits(),
        ["https://shop.example/c", "https://shop.example/c?page=2"]
    );
}

#[tokio::test]
async fn test_failed_category_is_isolated() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![listing(
        "https://shop.example/b",
        &[card("x", "X", "$5"), card("y", "Y", "$6")],
        None,
    )]);
    let cfg = config(&tmp);
    let (tx, mut rx) = progress::channel();

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[
            ("Broken A", "https://shop.example/a"),
            ("B", "https://shop.example/b"),
        ]),
        &cfg,
        Progress::new(Some(tx)),
    )
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::Wrote { count: 2 });
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(renderer.closes(), 1);

    let catalog = read_catalog(&cfg.output);
    let categories: Vec<&str> = catalog["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, ["B", "B"]);

    assert!(cfg.debug_dir.join("broken-a/error.html").exists());
    assert!(cfg.debug_dir.join("broken-a/error.png").exists());

    let mut failed = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        if let ProgressEventKind::CategoryFailed { name, error } = ev.event {
            failed.push((name, error));
        }
    }
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "Broken A");
    assert!(failed[0].1.contains("https://shop.example/a"));
}

#[tokio::test]
async fn test_zero_products_writes_empty_catalog_and_signals() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![PageSnapshot::new(
        "https://shop.example/empty",
        "<html><body><p>Coming soon</p></body></html>",
    )]);
    let cfg = config(&tmp);

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[("New Arrivals", "https://shop.example/empty")]),
        &cfg,
        Progress::disabled(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::NoProducts);
    assert_eq!(outcome.exit_code(), 2);

    let catalog: Catalog = serde_json::from_value(read_catalog(&cfg.output)).unwrap();
    assert_eq!(catalog.count, 0);
    assert!(catalog.products.is_empty());

    let page_dump = cfg.debug_dir.join("new-arrivals/page-1.html");
    assert!(std::fs::read_to_string(page_dump).unwrap().contains("Coming soon"));
}

#[tokio::test]
async fn test_debug_capture_can_be_disabled() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![]);
    let mut cfg = config(&tmp);
    cfg.debug_capture = false;

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[("Gone", "https://shop.example/gone")]),
        &cfg,
        Progress::disabled(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::NoProducts);
    assert!(!cfg.debug_dir.exists());
    assert!(cfg.output.exists());
}

#[tokio::test]
async fn test_duplicates_across_categories_first_seen_wins() {
    let tmp = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::new(vec![
        listing(
            "https://shop.example/new",
            &[card("hoop", "Hoop (New)", "$30"), card("cuff", "Cuff", "$20")],
            None,
        ),
        listing(
            "https://shop.example/sale",
            &[card("hoop", "Hoop (Sale)", "$25"), card("stud", "Stud", "$10")],
            None,
        ),
    ]);
    let cfg = config(&tmp);

    let outcome = run_with_renderer(
        &renderer,
        &categories(&[
            ("New", "https://shop.example/new"),
            ("Sale", "https://shop.example/sale"),
        ]),
        &cfg,
        Progress::disabled(),
    )
    .await
    .unwrap();
    assert_eq!(outcome, RunOutcome::Wrote { count: 3 });

    let catalog: Catalog = serde_json::from_value(read_catalog(&cfg.output)).unwrap();
    let ids: Vec<&str> = catalog.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["hoop", "cuff", "stud"]);
    assert_eq!(catalog.products[0].title, "Hoop (New)");
    assert_eq!(catalog.products[0].category, "New");

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), catalog.count);
}

// ── Strategy short-circuit ──

struct Counting {
    kind: StrategyKind,
    yields: bool,
    calls: Arc<AtomicUsize>,
}

impl Strategy for Counting {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn extract(&self, page: &PageSnapshot) -> Vec<Product> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.yields {
            return Vec::new();
        }
        vec![Product {
            id: format!("{}-{}", self.kind, page.url.len()),
            title: "Counted".to_string(),
            price: None,
            url: page.url.clone(),
            image: String::new(),
            available: true,
            category: String::new(),
        }]
    }
}

#[tokio::test]
async fn test_later_strategies_not_invoked_after_a_hit() {
    let renderer = ScriptedRenderer::new(vec![
        listing("https://shop.example/p1", &[], Some("/p2")),
        listing("https://shop.example/p2", &[], None),
    ]);
    let counters: Vec<Arc<AtomicUsize>> =
        (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let chain = StrategyChain::new(vec![
        Box::new(Counting {
            kind: StrategyKind::Network,
            yields: false,
            calls: counters[0].clone(),
        }),
        Box::new(Counting {
            kind: StrategyKind::StructuredData,
            yields: true,
            calls: counters[1].clone(),
        }),
        Box::new(Counting {
            kind: StrategyKind::Dom,
            yields: true,
            calls: counters[2].clone(),
        }),
    ]);

    let mut orchestrator = Orchestrator::new(
        CrawlOptions {
            page_delay_ms: 0,
            ..Default::default()
        },
        DebugCapture::disabled(),
    )
    .with_chain(chain);
    let result = orchestrator
        .run(&renderer, &[CategoryTask::new("All", "https://shop.example/p1")])
        .await
        .unwrap();

    assert_eq!(result.products.len(), 2);
    assert_eq!(result.categories[0].pages, 2);
    assert_eq!(counters[0].load(Ordering::SeqCst), 2);
    assert_eq!(counters[1].load(Ordering::SeqCst), 2);
    assert_eq!(counters[2].load(Ordering::SeqCst), 0);
}
