// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Each context listens to CDP network events for its page: JSON responses
//! are remembered by request id and their bodies fetched once the page has
//! settled, and the set of in-flight requests drives the network-idle wait.

use super::{scripts, NavigateOptions, PageSnapshot, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Quiet period that counts as "network idle".
const IDLE_QUIET_MS: u64 = 500;
const IDLE_POLL_MS: u64 = 100;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SHELFSCAN_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SHELFSCAN_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.shelfscan/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".shelfscan/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shelfscan/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shelfscan/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".shelfscan/chromium/chrome-linux64/chrome"),
                home.join(".shelfscan/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for bin in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(bin) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: tokio::sync::Mutex<Browser>,
    handler_task: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set SHELFSCAN_CHROMIUM_PATH or install Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1280, 1800)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            handler_task,
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        page.execute(EnableParams::default())
            .await
            .context("failed to enable network domain")?;

        let capture = Arc::new(NetworkCapture::default());
        let listeners = spawn_listeners(&page, Arc::clone(&capture)).await?;

        Ok(Box::new(ChromiumContext {
            page,
            capture,
            listeners,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!("browser close failed: {e}");
        }
        let _ = browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Network bookkeeping for one page.
#[derive(Default)]
struct NetworkCapture {
    inflight: Mutex<HashSet<String>>,
    json_requests: Mutex<Vec<String>>,
}

impl NetworkCapture {
    fn reset(&self) {
        if let Ok(mut set) = self.inflight.lock() {
            set.clear();
        }
        if let Ok(mut ids) = self.json_requests.lock() {
            ids.clear();
        }
    }

    fn inflight(&self) -> usize {
        self.inflight.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn take_json_requests(&self) -> Vec<String> {
        self.json_requests
            .lock()
            .map(|mut ids| std::mem::take(&mut *ids))
            .unwrap_or_default()
    }
}

async fn spawn_listeners(page: &Page, capture: Arc<NetworkCapture>) -> Result<Vec<JoinHandle<()>>> {
    let mut sent = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;
    let mut failed = page.event_listener::<EventLoadingFailed>().await?;
    let mut responses = page.event_listener::<EventResponseReceived>().await?;

    let c = Arc::clone(&capture);
    let sent_task = tokio::spawn(async move {
        while let Some(ev) = sent.next().await {
            if let Ok(mut set) = c.inflight.lock() {
                set.insert(ev.request_id.inner().clone());
            }
        }
    });

    let c = Arc::clone(&capture);
    let finished_task = tokio::spawn(async move {
        while let Some(ev) = finished.next().await {
            if let Ok(mut set) = c.inflight.lock() {
                set.remove(ev.request_id.inner());
            }
        }
    });

    let c = Arc::clone(&capture);
    let failed_task = tokio::spawn(async move {
        while let Some(ev) = failed.next().await {
            if let Ok(mut set) = c.inflight.lock() {
                set.remove(ev.request_id.inner());
            }
        }
    });

    let c = capture;
    let response_task = tokio::spawn(async move {
        while let Some(ev) = responses.next().await {
            let mime = ev.response.mime_type.to_lowercase();
            if mime.contains("application/json") || mime.ends_with("+json") {
                if let Ok(mut ids) = c.json_requests.lock() {
                    ids.push(ev.request_id.inner().clone());
                }
            }
        }
    });

    Ok(vec![sent_task, finished_task, failed_task, response_task])
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    capture: Arc<NetworkCapture>,
    listeners: Vec<JoinHandle<()>>,
}

impl ChromiumContext {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    /// Wait until no request has been in flight for a short quiet period, or
    /// until `limit_ms` elapses. Timing out is not an error.
    async fn wait_for_network_idle(&self, limit_ms: u64) {
        let deadline = Instant::now() + Duration::from_millis(limit_ms);
        let mut quiet_since: Option<Instant> = None;
        while Instant::now() < deadline {
            if self.capture.inflight() == 0 {
                let since = *quiet_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= Duration::from_millis(IDLE_QUIET_MS) {
                    return;
                }
            } else {
                quiet_since = None;
            }
            tokio::time::sleep(Duration::from_millis(IDLE_POLL_MS)).await;
        }
        debug!("network did not go idle within {limit_ms}ms");
    }

    async fn auto_scroll(&self, steps: u32, delay_ms: u64) {
        for _ in 0..steps {
            if self.eval::<bool>(scripts::SCROLL_TO_BOTTOM).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        let _ = self.eval::<bool>(scripts::SCROLL_TO_TOP).await;
    }

    async fn collect_json_bodies(&self) -> Vec<Value> {
        let mut bodies = Vec::new();
        for id in self.capture.take_json_requests() {
            let resp = match self
                .page
                .execute(GetResponseBodyParams::new(RequestId::new(id.clone())))
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    debug!("response body unavailable for {id}: {e}");
                    continue;
                }
            };
            let text = if resp.result.base64_encoded {
                match base64::engine::general_purpose::STANDARD.decode(&resp.result.body) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(_) => continue,
                }
            } else {
                resp.result.body.clone()
            };
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => bodies.push(value),
                Err(e) => debug!("skipping non-JSON body for {id}: {e}"),
            }
        }
        bodies
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<PageSnapshot> {
        let start = Instant::now();
        self.capture.reset();

        let result = tokio::time::timeout(
            Duration::from_millis(options.timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => bail!("navigation to {url} failed: {e}"),
            Err(_) => bail!("navigation to {url} timed out after {}ms", options.timeout_ms),
        }

        if options.network_idle_timeout_ms > 0 {
            self.wait_for_network_idle(options.network_idle_timeout_ms)
                .await;
        }

        if options.dismiss_overlays {
            match self.eval::<u32>(scripts::DISMISS_OVERLAYS).await {
                Ok(clicks) if clicks > 0 => {
                    debug!("dismissed {clicks} overlay control(s) on {url}");
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Ok(_) => {}
                Err(e) => debug!("overlay dismissal failed on {url}: {e}"),
            }
        }

        self.auto_scroll(options.scroll_steps, options.scroll_delay_ms)
            .await;
        tokio::time::sleep(Duration::from_millis(options.settle_ms)).await;

        let html: String = match self.eval(scripts::FLATTEN_DOM).await {
            Ok(html) => html,
            Err(e) => {
                debug!("DOM flattening failed on {url}, using plain markup: {e}");
                self.html().await?
            }
        };

        let final_url = self
            .page
            .url()
            .await
            .unwrap_or_default()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        let json_responses = self.collect_json_bodies().await;

        Ok(PageSnapshot {
            url: final_url,
            html,
            json_responses,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .screenshot(params)
            .await
            .context("screenshot failed")
    }

    async fn html(&self) -> Result<String> {
        self.eval("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        for task in &self.listeners {
            task.abort();
        }
        let _ = self.page.close().await;
        Ok(())
    }
}
