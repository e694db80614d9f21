// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::config::load_categories;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium availability and whether the category file loads.
pub async fn run(categories_path: &Path, base_url: Option<&str>) -> Result<()> {
    println!("Shelfscan Doctor");
    println!("================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium = find_chromium();
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set SHELFSCAN_CHROMIUM_PATH or install Chrome; \
             crawls fall back to plain HTTP."
        ),
    }

    let config_ok = match load_categories(categories_path, base_url) {
        Ok(set) => {
            println!(
                "[OK] {} categories from {} (source {})",
                set.tasks.len(),
                categories_path.display(),
                set.source
            );
            for task in &set.tasks {
                println!("       {} -> {}", task.name, task.url);
            }
            true
        }
        Err(e) => {
            println!("[!!] {e}");
            false
        }
    };

    println!();
    match (chromium.is_some(), config_ok) {
        (true, true) => println!("Status: READY"),
        (false, true) => println!("Status: READY (HTTP only)"),
        _ => println!("Status: NOT READY"),
    }
    Ok(())
}
