// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic page artifacts: a screenshot and the raw markup of the current
//! page, filed under `<root>/<slug(category)>/<label>.{png,html}`.
//!
//! Capture never fails the crawl. Every I/O or renderer error is logged and
//! dropped.

use crate::normalize;
use crate::renderer::RenderContext;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DebugCapture {
    root: Option<PathBuf>,
}

impl DebugCapture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A capture that writes nothing.
    pub fn disabled() -> Self {
        Self { root: None }
    }

    /// Directory artifacts for `category` land in.
    pub fn category_dir(&self, category: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(normalize::slugify(category)))
    }

    /// Write `<label>.png` and `<label>.html` for the context's current page.
    /// Returns the paths actually written.
    pub async fn capture(
        &self,
        ctx: &dyn RenderContext,
        category: &str,
        label: &str,
    ) -> Vec<PathBuf> {
        let Some(dir) = self.category_dir(category) else {
            return Vec::new();
        };
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!("cannot create debug directory {}: {e}", dir.display());
            return Vec::new();
        }

        let mut written = Vec::new();

        match ctx.screenshot().await {
            Ok(png) => {
                let path = dir.join(format!("{label}.png"));
                match tokio::fs::write(&path, png).await {
                    Ok(()) => written.push(path),
                    Err(e) => warn!("failed to write {}: {e}", path.display()),
                }
            }
            Err(e) => debug!("no screenshot for {category}/{label}: {e:#}"),
        }

        match ctx.html().await {
            Ok(html) => {
                let path = dir.join(format!("{label}.html"));
                match tokio::fs::write(&path, html).await {
                    Ok(()) => written.push(path),
                    Err(e) => warn!("failed to write {}: {e}", path.display()),
                }
            }
            Err(e) => debug!("no page markup for {category}/{label}: {e:#}"),
        }

        written
    }
}
