// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by the sync engine's local bookkeeping.
///
/// Remote outcomes are never errors; they are reported as [`crate::Outcome`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] pawsync_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sync engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;
