// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves where the session lives and how the engine is configured.

use std::path::PathBuf;
use std::sync::Arc;

use pawsync::{SyncConfig, SyncSession, CONFIG_FILE_NAME};
use pawsync_core::{StateDir, SystemClock};

use crate::env;
use crate::error::{Error, Result};
use crate::logging;

/// Log file written inside the state directory.
pub const LOG_FILE_NAME: &str = "pawsync.log";

/// Effective paths and configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: SyncConfig,
}

impl Context {
    /// Resolves the context from command-line overrides, the environment and
    /// the config file, in that order of precedence.
    pub fn resolve(state_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path
            .or_else(env::config_path)
            .or_else(default_config_path)
            .ok_or(Error::NoConfigDir)?;
        let config = SyncConfig::load(&config_path)?;
        let state_dir = state_dir
            .or_else(env::state_dir)
            .or_else(|| config.state_dir.clone())
            .or_else(default_state_dir)
            .ok_or(Error::NoStateDir)?;
        Ok(Context { state_dir, config_path, config })
    }

    /// Opens the persisted session, creating the state directory if needed.
    pub fn open_session(&self) -> Result<SyncSession> {
        let dir = StateDir::create(&self.state_dir)?;
        logging::setup_logging(&dir.root().join(LOG_FILE_NAME));
        tracing::debug!(state_dir = %self.state_dir.display(), "opening session");
        Ok(SyncSession::open(dir, Arc::new(SystemClock))?)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE_NAME)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pawsync").join(CONFIG_FILE_NAME))
}

fn default_state_dir() -> Option<PathBuf> {
    if let Some(dir) = env::xdg_state_home() {
        return Some(dir.join("pawsync"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/pawsync"))
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
