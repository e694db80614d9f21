// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP-only renderer wrapping reqwest.
//!
//! Not a browser: no script execution, no shadow DOM and no captured XHR
//! traffic. Used when Chromium is unavailable or explicitly disabled. Server
//! rendered storefronts still yield structured data and product cards.

use super::{NavigateOptions, PageSnapshot, RenderContext, Renderer};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const MAX_RETRIES: u32 = 2;

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if any.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

/// Renderer backed by a plain HTTP client.
#[derive(Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Single GET with retry on 5xx / transport errors and backoff on 429.
    pub async fn get(&self, url: &str, timeout_ms: u64) -> Result<HttpResponse> {
        let mut retries = 0u32;

        loop {
            let resp = self
                .client
                .get(url)
                .timeout(Duration::from_millis(timeout_ms))
                .send()
                .await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();

                    if status >= 500 && retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    let final_url = r.url().to_string();
                    let content_type = r
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.to_string());
                    let body = r.text().await.unwrap_or_default();

                    return Ok(HttpResponse {
                        final_url,
                        status,
                        content_type,
                        body,
                    });
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(HttpContext {
            renderer: self.clone(),
            last_html: String::new(),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// One "tab" of the HTTP renderer; remembers the last document it fetched.
pub struct HttpContext {
    renderer: HttpRenderer,
    last_html: String,
}

#[async_trait]
impl RenderContext for HttpContext {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<PageSnapshot> {
        let start = Instant::now();
        let resp = self.renderer.get(url, options.timeout_ms).await?;
        if resp.status >= 400 {
            bail!("GET {url} returned HTTP {}", resp.status);
        }

        let is_json = resp
            .content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let mut snapshot = PageSnapshot::new(resp.final_url, String::new());
        if is_json {
            match serde_json::from_str::<Value>(&resp.body) {
                Ok(value) => snapshot.json_responses.push(value),
                Err(e) => debug!("JSON document at {url} did not parse: {e}"),
            }
        } else {
            snapshot.html = resp.body;
        }
        self.last_html = snapshot.html.clone();

        if options.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.settle_ms)).await;
        }
        snapshot.load_time_ms = start.elapsed().as_millis() as u64;
        Ok(snapshot)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        bail!("screenshots require a browser renderer")
    }

    async fn html(&self) -> Result<String> {
        Ok(self.last_html.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
