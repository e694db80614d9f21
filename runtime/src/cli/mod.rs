// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the shelfscan binary.

pub mod crawl_cmd;
pub mod doctor;
pub mod extract_cmd;
pub mod logging;
pub mod output;
