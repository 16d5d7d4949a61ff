// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The entity tree: dogs and their reminders and logs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deletion::{DeletionTarget, Outbox, SubItemKind};
use crate::dog::Dog;
use crate::offline::Syncable;

/// Local copy of every dog the family owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTree {
    #[serde(default)]
    pub dogs: Vec<Dog>,
}

/// Number of dirty entities per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirtyCounts {
    pub dogs: usize,
    pub reminders: usize,
    pub logs: usize,
}

impl DirtyCounts {
    pub fn total(&self) -> usize {
        self.dogs + self.reminders + self.logs
    }
}

impl EntityTree {
    pub fn new(dogs: Vec<Dog>) -> Self {
        EntityTree { dogs }
    }

    pub fn dog(&self, uuid: Uuid) -> Option<&Dog> {
        self.dogs.iter().find(|d| d.uuid == uuid)
    }

    pub fn dog_mut(&mut self, uuid: Uuid) -> Option<&mut Dog> {
        self.dogs.iter_mut().find(|d| d.uuid == uuid)
    }

    pub fn dog_by_id(&self, dog_id: i64) -> Option<&Dog> {
        self.dogs.iter().find(|d| d.dog_id == Some(dog_id))
    }

    pub fn dog_by_id_mut(&mut self, dog_id: i64) -> Option<&mut Dog> {
        self.dogs.iter_mut().find(|d| d.dog_id == Some(dog_id))
    }

    /// Removes a dog by client identity.
    pub fn remove_dog(&mut self, uuid: Uuid) -> Option<Dog> {
        let index = self.dogs.iter().position(|d| d.uuid == uuid)?;
        Some(self.dogs.remove(index))
    }

    /// Removes whatever a deletion record targets, if it is present.
    ///
    /// Returns true if the tree changed.
    pub fn remove_target(&mut self, target: &DeletionTarget) -> bool {
        match *target {
            DeletionTarget::Container { dog_id } => {
                let before = self.dogs.len();
                self.dogs.retain(|d| d.dog_id != Some(dog_id));
                self.dogs.len() != before
            }
            DeletionTarget::SubItem { item, dog_id, item_id } => {
                let Some(dog) = self.dog_by_id_mut(dog_id) else {
                    return false;
                };
                match item {
                    SubItemKind::Reminder => dog.remove_reminder_by_id(item_id).is_some(),
                    SubItemKind::Log => dog.remove_log_by_id(item_id).is_some(),
                }
            }
        }
    }

    pub fn dirty_counts(&self) -> DirtyCounts {
        let mut counts = DirtyCounts::default();
        for dog in &self.dogs {
            counts.dogs += usize::from(dog.offline.needs_sync);
            counts.reminders += dog.reminders.iter().filter(|r| r.offline.needs_sync).count();
            counts.logs += dog.logs.iter().filter(|l| l.offline.needs_sync).count();
        }
        counts
    }

    /// Combines a tree pulled from the server with the local tree.
    ///
    /// The server's version wins for every entity except:
    /// - local entities still flagged `needs_sync` (their edit is newer),
    /// - local entities the server has never seen (no server id),
    /// - server entities queued for deletion in `outbox`, which are dropped.
    ///
    /// Server entities that match a local one keep the local uuid so callers
    /// holding it can still find them.
    pub fn merge_pulled(&self, pulled: EntityTree, outbox: &Outbox) -> EntityTree {
        let mut matched = HashSet::new();
        let mut dogs = Vec::with_capacity(pulled.dogs.len());

        for mut remote in pulled.dogs {
            if let Some(dog_id) = remote.dog_id {
                if outbox.covers(&DeletionTarget::dog(dog_id)) {
                    continue;
                }
            }
            let local = self.dogs.iter().find(|d| d.same_entity(&remote));
            let (local_reminders, local_logs) = match local {
                Some(local) => (local.reminders.as_slice(), local.logs.as_slice()),
                None => (&[][..], &[][..]),
            };
            let dog_id = remote.dog_id;
            let remote_reminders = std::mem::take(&mut remote.reminders);
            let reminders = merge_children(local_reminders, remote_reminders, |id| {
                dog_id.is_some_and(|dog| outbox.covers(&DeletionTarget::reminder(dog, id)))
            });
            let remote_logs = std::mem::take(&mut remote.logs);
            let logs = merge_children(local_logs, remote_logs, |id| {
                dog_id.is_some_and(|dog| outbox.covers(&DeletionTarget::log(dog, id)))
            });

            let mut merged = match local {
                Some(local) => {
                    matched.insert(local.uuid);
                    take_newer(local, remote)
                }
                None => accept_remote(remote),
            };
            merged.reminders = reminders;
            merged.logs = logs;
            dogs.push(merged);
        }

        dogs.extend(
            self.dogs
                .iter()
                .filter(|d| !matched.contains(&d.uuid) && keep_unmatched(*d))
                .cloned(),
        );

        EntityTree { dogs }
    }
}

/// Local unsynced edits win; otherwise the server version under the local uuid.
fn take_newer<T: Syncable + Clone>(local: &T, remote: T) -> T {
    if local.offline().needs_sync {
        return local.clone();
    }
    let mut remote = accept_remote(remote);
    remote.set_uuid(local.uuid());
    remote
}

fn accept_remote<T: Syncable>(mut remote: T) -> T {
    remote.offline_mut().mark_resolved();
    remote
}

/// A local entity the server didn't return survives only if the server has
/// never seen it or it carries an unsynced edit.
fn keep_unmatched<T: Syncable>(local: &T) -> bool {
    local.server_id().is_none() || local.offline().needs_sync
}

fn merge_children<T, F>(local: &[T], remote: Vec<T>, is_deleted: F) -> Vec<T>
where
    T: Syncable + Clone,
    F: Fn(i64) -> bool,
{
    let mut matched = HashSet::new();
    let mut merged = Vec::with_capacity(remote.len());

    for item in remote {
        if item.server_id().is_some_and(&is_deleted) {
            continue;
        }
        match local.iter().find(|l| l.same_entity(&item)) {
            Some(mine) => {
                matched.insert(mine.uuid());
                merged.push(take_newer(mine, item));
            }
            None => merged.push(accept_remote(item)),
        }
    }

    merged.extend(
        local
            .iter()
            .filter(|l| !matched.contains(&l.uuid()) && keep_unmatched(*l))
            .cloned(),
    );
    merged
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
