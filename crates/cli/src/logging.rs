// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Routes tracing output to `log_path`, falling back to stderr when the file
/// cannot be opened. Honors `RUST_LOG`; defaults to `info`.
///
/// Only the first call installs a subscriber.
pub fn setup_logging(log_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = fs::OpenOptions::new().create(true).append(true).open(log_path);
    let installed = if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init()
    };

    if installed.is_ok() {
        tracing::debug!(path = %log_path.display(), "logging initialized");
    }
}
