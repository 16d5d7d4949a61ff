// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The session store: ledger, entity tree and profile behind one lock.
//!
//! UI code marks entities dirty through the edit handlers here; the driver
//! reads the next unit and writes back results through the same lock, so
//! edits and sync bookkeeping are serialized. The lock is never held across
//! a remote call.

use std::sync::{Arc, Mutex, MutexGuard};

use pawsync_core::{
    Clock, DeletionRecord, DeletionTarget, DirtyCounts, Dog, EntityTree, Error, Family, Log,
    ProfileSnapshot, Reminder, ResyncClass, StateDir, SyncFlags, Syncable, UserProfile,
};
use uuid::Uuid;

use crate::error::Result;
use crate::ledger::SyncLedger;
use crate::scanner::{self, DirtyEntity};
use crate::unit::SyncUnit;

struct SessionState {
    ledger: SyncLedger,
    tree: EntityTree,
    profile: ProfileSnapshot,
}

/// Explicit context object owning all sync state for one running app.
pub struct SyncSession {
    state: Mutex<SessionState>,
    clock: Arc<dyn Clock>,
    state_dir: Option<StateDir>,
}

impl SyncSession {
    /// An empty session that is never persisted.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        SyncSession {
            state: Mutex::new(SessionState {
                ledger: SyncLedger::in_memory(),
                tree: EntityTree::default(),
                profile: ProfileSnapshot::default(),
            }),
            clock,
            state_dir: None,
        }
    }

    /// Loads a session from `state_dir`, creating an empty one if the
    /// directory holds no state yet.
    pub fn open(state_dir: StateDir, clock: Arc<dyn Clock>) -> Result<Self> {
        let tree = state_dir.load_tree()?;
        let profile = state_dir.load_profile()?;
        let ledger = SyncLedger::open(state_dir.clone())?;
        tracing::debug!(
            root = %state_dir.root().display(),
            dogs = tree.dogs.len(),
            queued_deletions = ledger.outbox().len(),
            "session opened"
        );
        Ok(SyncSession {
            state: Mutex::new(SessionState { ledger, tree, profile }),
            clock,
            state_dir: Some(state_dir),
        })
    }

    /// Replaces the entity tree wholesale, e.g. with one restored by the
    /// host from its own storage.
    pub fn with_tree(self, tree: EntityTree) -> Self {
        self.lock().tree = tree;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save_tree(&self, tree: &EntityTree) -> Result<()> {
        if let Some(dir) = &self.state_dir {
            dir.save_tree(tree)?;
        }
        Ok(())
    }

    fn save_profile(&self, profile: &ProfileSnapshot) -> Result<()> {
        if let Some(dir) = &self.state_dir {
            dir.save_profile(profile)?;
        }
        Ok(())
    }

    // -- Ledger --------------------------------------------------------------

    pub fn has_pending_work(&self) -> bool {
        let state = self.lock();
        state.ledger.has_pending_work(&state.tree)
    }

    /// Records that a class of state needs a push or pull, typically after a
    /// remote call elsewhere in the app went unanswered.
    pub fn mark_needs_resync(&self, class: ResyncClass) -> Result<bool> {
        self.lock().ledger.mark_needs_resync(class)
    }

    pub fn enqueue_deletion(&self, record: DeletionRecord) -> Result<bool> {
        self.lock().ledger.enqueue_deletion(record)
    }

    // -- Reads ---------------------------------------------------------------

    pub fn tree(&self) -> EntityTree {
        self.lock().tree.clone()
    }

    pub fn user_profile(&self) -> UserProfile {
        self.lock().profile.user.clone()
    }

    pub fn family(&self) -> Family {
        self.lock().profile.family.clone()
    }

    pub fn flags(&self) -> SyncFlags {
        self.lock().ledger.flags().clone()
    }

    pub fn outbox_records(&self) -> Vec<DeletionRecord> {
        self.lock().ledger.outbox().records().to_vec()
    }

    /// Dirty entities in the order the driver would push them.
    pub fn pending_entities(&self) -> Vec<DirtyEntity> {
        scanner::scan_all(&self.lock().tree)
    }

    pub fn dirty_counts(&self) -> DirtyCounts {
        self.lock().tree.dirty_counts()
    }

    // -- Local edit handlers -------------------------------------------------
    //
    // Every handler stages its change on a copy and installs it only once it
    // is saved, so an `Err` means the session is unchanged in memory.

    /// Adds a new, unborn dog and queues its create.
    pub fn add_dog(&self, name: impl Into<String>) -> Result<Uuid> {
        let now = self.clock.now();
        let mut dog = Dog::new(name, now);
        dog.offline.mark_needs_sync(now);
        let uuid = dog.uuid;

        self.stage_tree(|tree, _| {
            tree.dogs.push(dog);
            Ok(uuid)
        })
    }

    /// Edits a dog's own fields and queues the change.
    pub fn update_dog(&self, dog: Uuid, edit: impl FnOnce(&mut Dog)) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, _| {
            let target = tree.dog_mut(dog).ok_or(Error::DogNotFound(dog))?;
            edit(target);
            target.offline.mark_needs_sync(now);
            Ok(())
        })
    }

    /// Removes a dog and its children. A dog the server knows about is
    /// queued for deletion; an unborn one is simply dropped.
    ///
    /// The deletion is queued before the tree is saved. If that save fails
    /// the dog stays in memory, and replaying the deletion removes it.
    pub fn remove_dog(&self, dog: Uuid) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let removed = tree.remove_dog(dog).ok_or(Error::DogNotFound(dog))?;
            if let Some(dog_id) = removed.dog_id {
                let record = DeletionRecord::new(DeletionTarget::dog(dog_id), now);
                ledger.enqueue_deletion(record)?;
            }
            Ok(())
        })
    }

    /// Adds a reminder to a dog and queues its create.
    pub fn add_reminder(&self, dog: Uuid, mut reminder: Reminder) -> Result<Uuid> {
        let now = self.clock.now();
        reminder.reminder_id = None;
        reminder.offline.mark_needs_sync(now);
        let uuid = reminder.uuid;

        self.stage_tree(|tree, _| {
            let owner = tree.dog_mut(dog).ok_or(Error::DogNotFound(dog))?;
            owner.reminders.push(reminder);
            Ok(uuid)
        })
    }

    pub fn update_reminder(
        &self,
        dog: Uuid,
        reminder: Uuid,
        edit: impl FnOnce(&mut Reminder),
    ) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, _| {
            let target = tree
                .dog_mut(dog)
                .and_then(|d| d.reminder_mut(reminder))
                .ok_or(Error::ReminderNotFound { dog, reminder })?;
            edit(target);
            target.offline.mark_needs_sync(now);
            Ok(())
        })
    }

    pub fn remove_reminder(&self, dog: Uuid, reminder: Uuid) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let owner = tree.dog_mut(dog).ok_or(Error::DogNotFound(dog))?;
            let dog_id = owner.dog_id;
            let removed = owner
                .remove_reminder(reminder)
                .ok_or(Error::ReminderNotFound { dog, reminder })?;
            if let (Some(dog_id), Some(reminder_id)) = (dog_id, removed.reminder_id) {
                let target = DeletionTarget::reminder(dog_id, reminder_id);
                ledger.enqueue_deletion(DeletionRecord::new(target, now))?;
            }
            Ok(())
        })
    }

    /// Adds a log to a dog and queues its create.
    pub fn add_log(&self, dog: Uuid, mut log: Log) -> Result<Uuid> {
        let now = self.clock.now();
        log.log_id = None;
        log.offline.mark_needs_sync(now);
        let uuid = log.uuid;

        self.stage_tree(|tree, _| {
            let owner = tree.dog_mut(dog).ok_or(Error::DogNotFound(dog))?;
            owner.logs.push(log);
            Ok(uuid)
        })
    }

    pub fn update_log(&self, dog: Uuid, log: Uuid, edit: impl FnOnce(&mut Log)) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, _| {
            let target = tree
                .dog_mut(dog)
                .and_then(|d| d.log_mut(log))
                .ok_or(Error::LogNotFound { dog, log })?;
            edit(target);
            target.offline.mark_needs_sync(now);
            Ok(())
        })
    }

    pub fn remove_log(&self, dog: Uuid, log: Uuid) -> Result<()> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let owner = tree.dog_mut(dog).ok_or(Error::DogNotFound(dog))?;
            let dog_id = owner.dog_id;
            let removed = owner.remove_log(log).ok_or(Error::LogNotFound { dog, log })?;
            if let (Some(dog_id), Some(log_id)) = (dog_id, removed.log_id) {
                let target = DeletionTarget::log(dog_id, log_id);
                ledger.enqueue_deletion(DeletionRecord::new(target, now))?;
            }
            Ok(())
        })
    }

    /// Edits the user profile and queues a push.
    pub fn update_user_profile(&self, edit: impl FnOnce(&mut UserProfile)) -> Result<()> {
        let mut state = self.lock();
        let mut profile = state.profile.clone();
        edit(&mut profile.user);
        self.save_profile(&profile)?;
        state.profile = profile;
        state.ledger.mark_needs_resync(ResyncClass::PushUser)?;
        Ok(())
    }

    /// Runs `edit` against a copy of the tree and installs the copy once it
    /// is saved. Ledger changes made by `edit` persist on their own.
    fn stage_tree<R>(
        &self,
        edit: impl FnOnce(&mut EntityTree, &mut SyncLedger) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.lock();
        let mut staged = state.tree.clone();
        let out = edit(&mut staged, &mut state.ledger)?;
        self.save_tree(&staged)?;
        state.tree = staged;
        Ok(out)
    }

    // -- Driver side ---------------------------------------------------------

    pub(crate) fn next_unit(&self) -> Option<SyncUnit> {
        let state = self.lock();
        state.ledger.next_unit(&state.tree)
    }

    pub(crate) fn resolve(&self, class: ResyncClass) -> Result<bool> {
        self.lock().ledger.resolve(class)
    }

    /// The dog's own fields as they would be sent, without children.
    pub(crate) fn dog_payload(&self, dog: Uuid) -> Option<Dog> {
        let state = self.lock();
        let mut payload = state.tree.dog(dog)?.clone();
        payload.reminders.clear();
        payload.logs.clear();
        Some(payload)
    }

    /// The reminder and its dog's server id.
    pub(crate) fn reminder_payload(
        &self,
        dog: Uuid,
        reminder: Uuid,
    ) -> Option<(Option<i64>, Reminder)> {
        let state = self.lock();
        let owner = state.tree.dog(dog)?;
        Some((owner.dog_id, owner.reminder(reminder)?.clone()))
    }

    /// The log and its dog's server id.
    pub(crate) fn log_payload(&self, dog: Uuid, log: Uuid) -> Option<(Option<i64>, Log)> {
        let state = self.lock();
        let owner = state.tree.dog(dog)?;
        Some((owner.dog_id, owner.log(log)?.clone()))
    }

    /// Clears the push flag unless the profile was edited while the push was
    /// in flight; that edit still has to go out.
    pub(crate) fn settle_user_push(&self, sent: &UserProfile) -> Result<bool> {
        let mut state = self.lock();
        if state.profile.user != *sent {
            tracing::debug!("profile edited during push, pushing again");
            return Ok(false);
        }
        state.ledger.resolve(ResyncClass::PushUser)
    }

    /// Stores a pulled user profile. Skipped when a local edit arrived while
    /// the pull was in flight, since that edit has yet to be pushed.
    pub(crate) fn apply_pulled_user(&self, user: UserProfile) -> Result<bool> {
        let mut state = self.lock();
        if state.ledger.flags().needs_push_user_profile {
            tracing::debug!("local profile edit pending, keeping it over pulled user");
            return Ok(false);
        }
        let profile = ProfileSnapshot { user, ..state.profile.clone() };
        self.save_profile(&profile)?;
        state.profile = profile;
        Ok(true)
    }

    pub(crate) fn apply_pulled_family(&self, family: Family) -> Result<()> {
        let mut state = self.lock();
        let profile = ProfileSnapshot { family, ..state.profile.clone() };
        self.save_profile(&profile)?;
        state.profile = profile;
        Ok(())
    }

    /// Merges a pulled tree into the local one and returns the result.
    pub(crate) fn apply_pulled_tree(&self, pulled: EntityTree) -> Result<EntityTree> {
        let mut state = self.lock();
        let merged = state.tree.merge_pulled(pulled, state.ledger.outbox());
        self.save_tree(&merged)?;
        state.tree = merged.clone();
        Ok(merged)
    }

    /// Dequeues a replayed deletion and removes its target from the tree if
    /// it reappeared locally. Returns true if the tree changed.
    pub(crate) fn complete_deletion(&self, target: &DeletionTarget) -> Result<bool> {
        let mut state = self.lock();
        state.ledger.complete_deletion(target)?;
        let mut staged = state.tree.clone();
        if !staged.remove_target(target) {
            return Ok(false);
        }
        tracing::info!(%target, "deleted entity had reappeared locally, removed it again");
        self.save_tree(&staged)?;
        state.tree = staged;
        Ok(true)
    }

    /// Records the definitive outcome of pushing `sent`.
    ///
    /// Stores `assigned_id` (from a successful create), and clears the dirty
    /// flag unless the dog was edited while the call was in flight. If the
    /// dog was removed meanwhile, the newly created server copy is queued for
    /// deletion. Returns true if a server id was assigned.
    pub(crate) fn settle_dog(&self, sent: &Dog, assigned_id: Option<i64>) -> Result<bool> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let Some(dog) = tree.dog_mut(sent.uuid) else {
                if let Some(id) = assigned_id {
                    ledger.enqueue_deletion(DeletionRecord::new(DeletionTarget::dog(id), now))?;
                }
                return Ok(false);
            };
            let unchanged = dog.same_content(sent);
            Ok(settle(dog, assigned_id, unchanged))
        })
    }

    pub(crate) fn settle_reminder(
        &self,
        dog: Uuid,
        dog_id: i64,
        sent: &Reminder,
        assigned_id: Option<i64>,
    ) -> Result<bool> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let Some(reminder) = tree.dog_mut(dog).and_then(|d| d.reminder_mut(sent.uuid)) else {
                if let Some(id) = assigned_id {
                    let target = DeletionTarget::reminder(dog_id, id);
                    ledger.enqueue_deletion(DeletionRecord::new(target, now))?;
                }
                return Ok(false);
            };
            let unchanged = reminder.same_content(sent);
            Ok(settle(reminder, assigned_id, unchanged))
        })
    }

    pub(crate) fn settle_log(
        &self,
        dog: Uuid,
        dog_id: i64,
        sent: &Log,
        assigned_id: Option<i64>,
    ) -> Result<bool> {
        let now = self.clock.now();
        self.stage_tree(|tree, ledger| {
            let Some(log) = tree.dog_mut(dog).and_then(|d| d.log_mut(sent.uuid)) else {
                if let Some(id) = assigned_id {
                    let target = DeletionTarget::log(dog_id, id);
                    ledger.enqueue_deletion(DeletionRecord::new(target, now))?;
                }
                return Ok(false);
            };
            let unchanged = log.same_content(sent);
            Ok(settle(log, assigned_id, unchanged))
        })
    }

    /// Clears the dirty flag of an entity that can never be pushed.
    pub(crate) fn abandon(&self, entity: DirtyEntity) -> Result<()> {
        self.stage_tree(|tree, _| {
            let Some(owner) = tree.dog_mut(entity.dog()) else {
                return Ok(());
            };
            let offline = match entity {
                DirtyEntity::Dog { .. } => Some(&mut owner.offline),
                DirtyEntity::Reminder { reminder, .. } => {
                    owner.reminder_mut(reminder).map(|r| &mut r.offline)
                }
                DirtyEntity::Log { log, .. } => owner.log_mut(log).map(|l| &mut l.offline),
            };
            if let Some(offline) = offline {
                offline.mark_resolved();
            }
            Ok(())
        })
    }
}

fn settle<T: Syncable>(entity: &mut T, assigned_id: Option<i64>, unchanged: bool) -> bool {
    let assigned = match assigned_id {
        Some(id) if entity.server_id() != Some(id) => {
            entity.set_server_id(id);
            true
        }
        _ => false,
    };
    if unchanged {
        entity.offline_mut().mark_resolved();
    }
    assigned
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
