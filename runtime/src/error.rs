// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration errors. All of them are fatal and reported before any page
//! is crawled.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read category file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("category file {path} is not a JSON object of name -> URL: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("no categories found in {0}")]
    NoCategories(PathBuf),

    #[error("category file {0} not found and no --base-url given")]
    MissingBaseUrl(PathBuf),

    #[error("invalid URL for {name}: {url:?}")]
    InvalidUrl { name: String, url: String },
}
