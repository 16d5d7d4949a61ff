// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Selection of the next unit of sync work.

use std::fmt;

use pawsync_core::{DeletionRecord, EntityTree, Outbox, ResyncClass, SyncFlags};

use crate::scanner::{self, DirtyEntity};

/// One remote operation's worth of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncUnit {
    /// Push or pull a whole class of state.
    Resync(ResyncClass),
    /// Replay the head of the deletion outbox.
    ReplayDeletion(DeletionRecord),
    /// Create or update one dirty entity.
    Entity(DirtyEntity),
}

impl fmt::Display for SyncUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncUnit::Resync(class) => write!(f, "{class}"),
            SyncUnit::ReplayDeletion(record) => write!(f, "delete {}", record.target),
            SyncUnit::Entity(entity) => write!(f, "push {entity}"),
        }
    }
}

/// Picks the highest-priority pending unit, or `None` when the episode is
/// complete.
///
/// Priority: push user, pull user, pull family, pull entity tree, the
/// outbox head, then the scanner's next dirty entity. Pushing the user
/// before pulling it keeps a pull from discarding an unsynced local edit.
pub fn next_unit(flags: &SyncFlags, outbox: &Outbox, tree: &EntityTree) -> Option<SyncUnit> {
    if let Some(class) = flags.first_pending() {
        return Some(SyncUnit::Resync(class));
    }
    if let Some(record) = outbox.head() {
        return Some(SyncUnit::ReplayDeletion(record.clone()));
    }
    scanner::next_dirty(tree).map(SyncUnit::Entity)
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
