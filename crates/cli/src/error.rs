// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors reported by the `pawsync` CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] pawsync_core::Error),

    #[error(transparent)]
    Sync(#[from] pawsync::SyncError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no state directory\n  hint: pass --state-dir or set PAWSYNC_STATE_DIR")]
    NoStateDir,

    #[error("no config directory\n  hint: pass --config or set PAWSYNC_CONFIG")]
    NoConfigDir,
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
