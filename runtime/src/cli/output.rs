// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Console output helpers and the progress reporter.
//!
//! Global flags are published through environment variables by `main` so
//! every command can check them without threading them through.

use crate::progress::{ProgressEventKind, ProgressReceiver};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

pub fn is_quiet() -> bool {
    std::env::var("SHELFSCAN_QUIET").is_ok()
}

pub fn is_verbose() -> bool {
    std::env::var("SHELFSCAN_VERBOSE").is_ok()
}

pub fn use_color() -> bool {
    std::env::var("SHELFSCAN_NO_COLOR").is_err() && std::env::var("NO_COLOR").is_err()
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

/// Status symbols, colored unless color is disabled.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self { color: use_color() }
    }

    fn paint(&self, code: &str, sym: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{sym}\x1b[0m")
        } else {
            sym.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint("32", "✓")
    }

    pub fn err_sym(&self) -> String {
        self.paint("31", "✗")
    }

    pub fn warn_sym(&self) -> String {
        self.paint("33", "!")
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one progress event as a console line, `None` when the event is
/// not shown at the current verbosity.
pub fn render_event(event: &ProgressEventKind, s: &Styled, verbose: bool) -> Option<String> {
    match event {
        ProgressEventKind::CategoryStarted { name, url } => {
            Some(format!("Category: {name} -> {url}"))
        }
        ProgressEventKind::PageExtracted {
            page,
            items,
            strategy,
            load_ms,
            ..
        } if verbose => {
            let via = strategy
                .map(|k| k.to_string())
                .unwrap_or_else(|| "no strategy".to_string());
            Some(s.dim(&format!("    page {page}: {items} items ({via}, {load_ms}ms)")))
        }
        ProgressEventKind::PageExtracted { .. } => None,
        ProgressEventKind::CategoryFinished { items, .. } => {
            Some(format!("  {} {items} items", s.ok_sym()))
        }
        ProgressEventKind::CategoryFailed { name, error } => Some(format!(
            "  {} Category failed: {name}: {error}",
            s.err_sym()
        )),
        ProgressEventKind::Warning { message } if verbose => {
            Some(format!("  {} {message}", s.warn_sym()))
        }
        ProgressEventKind::Warning { .. } => None,
    }
}

/// Print progress events until the channel closes.
pub fn spawn_reporter(mut rx: ProgressReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        let s = Styled::new();
        let quiet = is_quiet();
        let verbose = is_verbose();
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    if quiet {
                        continue;
                    }
                    if let Some(line) = render_event(&ev.event, &s, verbose) {
                        if matches!(ev.event, ProgressEventKind::CategoryFailed { .. }) {
                            eprintln!("{line}");
                        } else {
                            println!("{line}");
                        }
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::StrategyKind;

    #[test]
    fn test_render_lines() {
        let s = Styled { color: false };
        let started = ProgressEventKind::CategoryStarted {
            name: "Rings".into(),
            url: "https://shop.example/rings".into(),
        };
        assert_eq!(
            render_event(&started, &s, false).unwrap(),
            "Category: Rings -> https://shop.example/rings"
        );

        let finished = ProgressEventKind::CategoryFinished {
            name: "Rings".into(),
            pages: 3,
            items: 42,
        };
        assert_eq!(render_event(&finished, &s, false).unwrap(), "  ✓ 42 items");

        let failed = ProgressEventKind::CategoryFailed {
            name: "Sale".into(),
            error: "timed out".into(),
        };
        assert_eq!(
            render_event(&failed, &s, false).unwrap(),
            "  ✗ Category failed: Sale: timed out"
        );
    }

    #[test]
    fn test_page_lines_only_when_verbose() {
        let s = Styled { color: false };
        let page = ProgressEventKind::PageExtracted {
            category: "Rings".into(),
            page: 2,
            url: "https://shop.example/rings?page=2".into(),
            items: 12,
            strategy: Some(StrategyKind::Dom),
            load_ms: 340,
        };
        assert!(render_event(&page, &s, false).is_none());
        assert_eq!(
            render_event(&page, &s, true).unwrap(),
            "    page 2: 12 items (dom, 340ms)"
        );
    }
}
