// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pawsync-core operations.

use thiserror::Error;
use uuid::Uuid;

/// All possible errors that can occur in pawsync-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dog not found: {0}")]
    DogNotFound(Uuid),

    #[error("reminder not found: {reminder} (dog {dog})")]
    ReminderNotFound { dog: Uuid, reminder: Uuid },

    #[error("log not found: {log} (dog {dog})")]
    LogNotFound { dog: Uuid, log: Uuid },

    #[error("invalid resync class: '{0}'\n  hint: valid classes are: push-user, pull-user, pull-family, pull-entity-tree")]
    InvalidResyncClass(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for pawsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
