// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shelfscan runtime library: storefront product extraction.
//!
//! Renders category listing pages, mines products out of captured network
//! JSON, embedded JSON-LD or product-card markup, follows pagination and
//! writes one deduplicated catalog.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod debug;
pub mod error;
pub mod extraction;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod progress;
pub mod renderer;
