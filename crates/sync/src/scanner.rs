// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Finds dirty entities in the entity tree.
//!
//! Tiers are scanned in a fixed order (dogs, reminders, logs) because a
//! child can only be pushed once its dog exists server-side. Within a tier
//! the oldest-queued entity comes first. The scanner always reads the live
//! tree, so edits made mid-episode are picked up by the next scan.

use std::fmt;

use chrono::{DateTime, Utc};
use pawsync_core::{EntityTree, Syncable};
use serde::Serialize;
use uuid::Uuid;

/// Entity tier, in push priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Dogs,
    Reminders,
    Logs,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Dogs, Tier::Reminders, Tier::Logs];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Dogs => write!(f, "dogs"),
            Tier::Reminders => write!(f, "reminders"),
            Tier::Logs => write!(f, "logs"),
        }
    }
}

/// A dirty entity, addressed by client uuids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirtyEntity {
    Dog { dog: Uuid },
    Reminder { dog: Uuid, reminder: Uuid },
    Log { dog: Uuid, log: Uuid },
}

impl DirtyEntity {
    pub fn tier(&self) -> Tier {
        match self {
            DirtyEntity::Dog { .. } => Tier::Dogs,
            DirtyEntity::Reminder { .. } => Tier::Reminders,
            DirtyEntity::Log { .. } => Tier::Logs,
        }
    }

    /// The owning dog (the dog itself for a dog).
    pub fn dog(&self) -> Uuid {
        match *self {
            DirtyEntity::Dog { dog }
            | DirtyEntity::Reminder { dog, .. }
            | DirtyEntity::Log { dog, .. } => dog,
        }
    }
}

impl fmt::Display for DirtyEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirtyEntity::Dog { dog } => write!(f, "dog {dog}"),
            DirtyEntity::Reminder { dog, reminder } => write!(f, "reminder {reminder} (dog {dog})"),
            DirtyEntity::Log { dog, log } => write!(f, "log {log} (dog {dog})"),
        }
    }
}

/// Dirty entities of one tier, oldest-queued first.
pub fn dirty_tier(tree: &EntityTree, tier: Tier) -> Vec<DirtyEntity> {
    let mut found: Vec<(DateTime<Utc>, DirtyEntity)> = Vec::new();
    for dog in &tree.dogs {
        match tier {
            Tier::Dogs => {
                collect(&mut found, std::slice::from_ref(dog), |dog| DirtyEntity::Dog { dog })
            }
            Tier::Reminders => collect(&mut found, &dog.reminders, |reminder| {
                DirtyEntity::Reminder { dog: dog.uuid, reminder }
            }),
            Tier::Logs => {
                collect(&mut found, &dog.logs, |log| DirtyEntity::Log { dog: dog.uuid, log })
            }
        }
    }
    found.sort_by_key(|(key, _)| *key);
    found.into_iter().map(|(_, entity)| entity).collect()
}

fn collect<T, F>(found: &mut Vec<(DateTime<Utc>, DirtyEntity)>, items: &[T], address: F)
where
    T: Syncable,
    F: Fn(Uuid) -> DirtyEntity,
{
    found.extend(
        items
            .iter()
            .filter(|item| item.offline().needs_sync)
            .map(|item| (item.offline().sync_order_key(), address(item.uuid()))),
    );
}

/// The single next entity to push: the head of the first non-empty tier.
pub fn next_dirty(tree: &EntityTree) -> Option<DirtyEntity> {
    Tier::ALL.into_iter().find_map(|tier| dirty_tier(tree, tier).into_iter().next())
}

/// Every dirty entity, in the order they would be pushed.
pub fn scan_all(tree: &EntityTree) -> Vec<DirtyEntity> {
    Tier::ALL.into_iter().flat_map(|tier| dirty_tier(tree, tier)).collect()
}

pub fn has_dirty(tree: &EntityTree) -> bool {
    tree.dogs.iter().any(|dog| {
        dog.offline.needs_sync
            || dog.reminders.iter().any(|r| r.offline.needs_sync)
            || dog.logs.iter().any(|l| l.offline.needs_sync)
    })
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
