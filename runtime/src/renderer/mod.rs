// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (Chromium via chromiumoxide, or a plain HTTP fetcher
//! when no browser is available).

pub mod chromium;
pub mod http;
pub mod scripts;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything one navigation produced.
///
/// Captured responses belong to this navigation only; a context never carries
/// responses over from a previous page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// The final URL after any redirects.
    pub url: String,
    /// Serialized DOM with open shadow roots and same-origin frames inlined.
    pub html: String,
    /// Parsed bodies of JSON responses observed while the page loaded.
    pub json_responses: Vec<Value>,
    /// Time taken to load and settle the page in milliseconds.
    pub load_time_ms: u64,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn with_responses(mut self, responses: Vec<Value>) -> Self {
        self.json_responses = responses;
        self
    }
}

/// How long and how thoroughly to wait for a page before snapshotting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateOptions {
    /// Hard limit for the initial document load.
    pub timeout_ms: u64,
    /// Upper bound for waiting on network quiescence. Zero skips the wait.
    pub network_idle_timeout_ms: u64,
    /// Fixed delay after load so client-side rendering can finish.
    pub settle_ms: u64,
    /// Scroll-to-bottom passes used to trigger lazy loading.
    pub scroll_steps: u32,
    /// Pause after each scroll pass.
    pub scroll_delay_ms: u64,
    /// Click away cookie banners and consent dialogs before extracting.
    pub dismiss_overlays: bool,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            network_idle_timeout_ms: 15_000,
            settle_ms: 800,
            scroll_steps: 6,
            scroll_delay_ms: 700,
            dismiss_overlays: true,
        }
    }
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Short engine name for logs.
    fn name(&self) -> &'static str;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL, wait for it to settle and snapshot it.
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<PageSnapshot>;
    /// Full-page PNG screenshot of the current page.
    async fn screenshot(&self) -> Result<Vec<u8>>;
    /// Raw markup of the current page.
    async fn html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
