// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Stored in `pawsync.toml`:
//! - `retry_delay_secs`: fixed delay before retrying after a no-response
//! - `state_dir`: where the session is persisted; in-memory when absent

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "pawsync.toml";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds to wait after a no-response before the next episode (default: 15).
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Directory the session is persisted in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

fn default_retry_delay_secs() -> u64 {
    15
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig { retry_delay_secs: default_retry_delay_secs(), state_dir: None }
    }
}

impl SyncConfig {
    /// Loads configuration from `path`, or defaults if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content)
    }

    /// Parses and validates TOML configuration.
    pub fn parse(content: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(content)
            .map_err(|e| SyncError::Config(format!("failed to parse {CONFIG_FILE_NAME}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_delay_secs == 0 {
            return Err(SyncError::Config("retry_delay_secs must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SyncError::Config(e.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
