// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of a persisted sync session.
//!
//! ```text
//! <state_dir>/
//!   sync_flags.json   pending push/pull flags
//!   outbox.jsonl      deletion outbox, one record per line, replay order
//!   entities.json     entity tree including offline bookkeeping
//!   profile.json      user profile and family
//! ```
//!
//! Missing files load as empty/default state so a fresh directory is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::deletion::{DeletionRecord, Outbox};
use crate::error::Result;
use crate::flags::SyncFlags;
use crate::jsonl;
use crate::tree::EntityTree;
use crate::user::{Family, UserProfile};

const FLAGS_FILE: &str = "sync_flags.json";
const OUTBOX_FILE: &str = "outbox.jsonl";
const ENTITIES_FILE: &str = "entities.json";
const PROFILE_FILE: &str = "profile.json";

/// User profile and family, persisted together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub user: UserProfile,
    pub family: Family,
}

/// A directory holding one persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Opens (creating if needed) a state directory.
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(StateDir { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flags_path(&self) -> PathBuf {
        self.root.join(FLAGS_FILE)
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.root.join(OUTBOX_FILE)
    }

    pub fn entities_path(&self) -> PathBuf {
        self.root.join(ENTITIES_FILE)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root.join(PROFILE_FILE)
    }

    pub fn load_flags(&self) -> Result<SyncFlags> {
        Ok(jsonl::read_document(&self.flags_path())?.unwrap_or_default())
    }

    pub fn save_flags(&self, flags: &SyncFlags) -> Result<()> {
        jsonl::write_document(&self.flags_path(), flags)
    }

    pub fn load_outbox(&self) -> Result<Outbox> {
        let records: Vec<DeletionRecord> = jsonl::read_all(&self.outbox_path())?;
        Ok(Outbox::from_records(records))
    }

    pub fn save_outbox(&self, outbox: &Outbox) -> Result<()> {
        jsonl::write_all(&self.outbox_path(), outbox.records())
    }

    pub fn load_tree(&self) -> Result<EntityTree> {
        Ok(jsonl::read_document(&self.entities_path())?.unwrap_or_default())
    }

    pub fn save_tree(&self, tree: &EntityTree) -> Result<()> {
        jsonl::write_document(&self.entities_path(), tree)
    }

    pub fn load_profile(&self) -> Result<ProfileSnapshot> {
        Ok(jsonl::read_document(&self.profile_path())?.unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &ProfileSnapshot) -> Result<()> {
        jsonl::write_document(&self.profile_path(), profile)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
