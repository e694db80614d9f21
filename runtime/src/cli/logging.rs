// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup. Logs go to stderr so stdout stays clean for
//! command output.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a given verbosity.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    let debug_env = std::env::var("SHELFSCAN_DEBUG")
        .map(|v| v == "1")
        .unwrap_or(false);
    if verbose || debug_env {
        "shelfscan=debug"
    } else if quiet {
        "shelfscan=error"
    } else {
        "shelfscan=info"
    }
}

/// Install the global subscriber. `RUST_LOG` directives are layered on top of
/// the default.
pub fn init(verbose: bool, quiet: bool, json: bool) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = default_directive(verbose, quiet).parse() {
        filter = filter.add_directive(directive);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(super::output::use_color()).try_init()
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
