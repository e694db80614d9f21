// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for crawl telemetry.
//!
//! The crawler and orchestrator emit `ProgressEvent`s which flow through a
//! `tokio::sync::broadcast` channel to the console reporter. When no
//! subscriber exists, events are silently dropped.

use crate::extraction::StrategyKind;
use serde::Serialize;

/// A progress event emitted during a crawl.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// A category crawl has started at its root URL.
    CategoryStarted { name: String, url: String },
    /// One listing page was navigated and run through the strategy chain.
    PageExtracted {
        category: String,
        page: u32,
        url: String,
        items: usize,
        strategy: Option<StrategyKind>,
        load_ms: u64,
    },
    /// A category finished, possibly after a later-page failure.
    CategoryFinished {
        name: String,
        pages: u32,
        items: usize,
    },
    /// A category failed as a whole and contributed nothing.
    CategoryFailed { name: String, error: String },
    /// A non-fatal warning occurred.
    Warning { message: String },
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emits events with a shared sequence counter. A reporter without a
/// sender is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<ProgressSender>,
    seq: u64,
}

impl Progress {
    pub fn new(tx: Option<ProgressSender>) -> Self {
        Self { tx, seq: 0 }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Emit an event, ignoring send errors (no receivers listening).
    pub fn emit(&mut self, event: ProgressEventKind) {
        if let Some(ref sender) = self.tx {
            self.seq += 1;
            let _ = sender.send(ProgressEvent {
                seq: self.seq,
                event,
            });
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.emit(ProgressEventKind::Warning {
            message: message.into(),
        });
    }
}
