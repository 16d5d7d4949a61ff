// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-sync flags and the deletion outbox.
//!
//! Both survive restarts when the ledger is backed by a [`StateDir`]. A
//! change is written to disk before it is applied in memory, so a failed
//! write leaves the ledger as it was.

use pawsync_core::{
    DeletionRecord, DeletionTarget, EntityTree, Outbox, ResyncClass, StateDir, SyncFlags,
};

use crate::error::Result;
use crate::scanner;
use crate::unit::{self, SyncUnit};

/// Process-wide record of what still has to reach the server.
#[derive(Debug, Default)]
pub struct SyncLedger {
    flags: SyncFlags,
    outbox: Outbox,
    state_dir: Option<StateDir>,
}

impl SyncLedger {
    /// A ledger that is never persisted.
    pub fn in_memory() -> Self {
        SyncLedger::default()
    }

    /// Loads the ledger from `state_dir`; missing files start empty.
    pub fn open(state_dir: StateDir) -> Result<Self> {
        let flags = state_dir.load_flags()?;
        let outbox = state_dir.load_outbox()?;
        Ok(SyncLedger { flags, outbox, state_dir: Some(state_dir) })
    }

    pub fn flags(&self) -> &SyncFlags {
        &self.flags
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Flags a class as needing a push or pull. Setting an already-set flag
    /// is a no-op. Returns true if the flag changed.
    pub fn mark_needs_resync(&mut self, class: ResyncClass) -> Result<bool> {
        self.set_flag(class, true)
    }

    /// Clears a flag after a definitive response.
    pub fn resolve(&mut self, class: ResyncClass) -> Result<bool> {
        self.set_flag(class, false)
    }

    fn set_flag(&mut self, class: ResyncClass, value: bool) -> Result<bool> {
        let mut flags = self.flags.clone();
        if !flags.set(class, value) {
            return Ok(false);
        }
        if let Some(dir) = &self.state_dir {
            dir.save_flags(&flags)?;
        }
        tracing::debug!(%class, value, "sync flag changed");
        self.flags = flags;
        Ok(true)
    }

    /// Queues a server-side deletion. Duplicates and children of an already
    /// queued dog are ignored. Returns true if the outbox changed.
    pub fn enqueue_deletion(&mut self, record: DeletionRecord) -> Result<bool> {
        let target = record.target;
        let mut outbox = self.outbox.clone();
        if !outbox.enqueue(record) {
            tracing::debug!(%target, "deletion already queued");
            return Ok(false);
        }
        self.replace_outbox(outbox)?;
        tracing::debug!(%target, queued = self.outbox.len(), "deletion queued");
        Ok(true)
    }

    /// Drops the record for `target` after a definitive response.
    pub fn complete_deletion(&mut self, target: &DeletionTarget) -> Result<bool> {
        let mut outbox = self.outbox.clone();
        if !outbox.remove(target) {
            return Ok(false);
        }
        self.replace_outbox(outbox)?;
        Ok(true)
    }

    fn replace_outbox(&mut self, outbox: Outbox) -> Result<()> {
        if let Some(dir) = &self.state_dir {
            dir.save_outbox(&outbox)?;
        }
        self.outbox = outbox;
        Ok(())
    }

    /// True if any flag is set, the outbox is non-empty, or `tree` holds a
    /// dirty entity.
    pub fn has_pending_work(&self, tree: &EntityTree) -> bool {
        self.flags.any() || !self.outbox.is_empty() || scanner::has_dirty(tree)
    }

    /// The next unit of work against `tree`.
    pub fn next_unit(&self, tree: &EntityTree) -> Option<SyncUnit> {
        unit::next_unit(&self.flags, &self.outbox, tree)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
