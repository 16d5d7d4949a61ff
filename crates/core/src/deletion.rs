// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deletion records and the outbox that orders their replay.
//!
//! Ordering rules:
//! 1. Dog deletions before reminder deletions before log deletions
//! 2. Within a group, oldest `deleted_at` first
//! 3. Equal keys keep insertion order (stable sort)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of child a sub-item deletion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubItemKind {
    Reminder,
    Log,
}

impl fmt::Display for SubItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubItemKind::Reminder => write!(f, "reminder"),
            SubItemKind::Log => write!(f, "log"),
        }
    }
}

/// What a deletion record removes on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeletionTarget {
    /// A whole dog (and implicitly its children).
    Container { dog_id: i64 },
    /// A reminder or log belonging to `dog_id`.
    SubItem {
        item: SubItemKind,
        dog_id: i64,
        item_id: i64,
    },
}

impl DeletionTarget {
    pub fn dog(dog_id: i64) -> Self {
        DeletionTarget::Container { dog_id }
    }

    pub fn reminder(dog_id: i64, reminder_id: i64) -> Self {
        DeletionTarget::SubItem { item: SubItemKind::Reminder, dog_id, item_id: reminder_id }
    }

    pub fn log(dog_id: i64, log_id: i64) -> Self {
        DeletionTarget::SubItem { item: SubItemKind::Log, dog_id, item_id: log_id }
    }

    /// The owning dog's server id.
    pub fn dog_id(&self) -> i64 {
        match *self {
            DeletionTarget::Container { dog_id } | DeletionTarget::SubItem { dog_id, .. } => dog_id,
        }
    }

    /// Replay group: containers first, then reminders, then logs.
    fn group(&self) -> u8 {
        match self {
            DeletionTarget::Container { .. } => 0,
            DeletionTarget::SubItem { item: SubItemKind::Reminder, .. } => 1,
            DeletionTarget::SubItem { item: SubItemKind::Log, .. } => 2,
        }
    }
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Container { dog_id } => write!(f, "dog {dog_id}"),
            DeletionTarget::SubItem { item, dog_id, item_id } => {
                write!(f, "{item} {item_id} (dog {dog_id})")
            }
        }
    }
}

/// A queued server-side deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
    #[serde(flatten)]
    pub target: DeletionTarget,
    pub deleted_at: DateTime<Utc>,
}

impl DeletionRecord {
    pub fn new(target: DeletionTarget, deleted_at: DateTime<Utc>) -> Self {
        DeletionRecord { target, deleted_at }
    }
}

/// Ordered queue of deletions awaiting replay.
///
/// At most one record exists per target. Enqueueing a dog deletion drops any
/// queued reminder/log deletions for the same dog, since deleting the dog
/// server-side removes its children too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    records: Vec<DeletionRecord>,
}

impl Outbox {
    /// Builds an outbox from persisted records, restoring the ordering rule
    /// and dropping duplicates.
    pub fn from_records(records: Vec<DeletionRecord>) -> Self {
        let mut outbox = Outbox::default();
        for record in records {
            outbox.enqueue(record);
        }
        outbox
    }

    /// Appends a record unless one for the same target is already queued, or
    /// its dog is already queued for deletion. Returns true if the outbox
    /// changed.
    pub fn enqueue(&mut self, record: DeletionRecord) -> bool {
        let dog_id = record.target.dog_id();
        if self.contains(&record.target) || self.contains(&DeletionTarget::dog(dog_id)) {
            return false;
        }
        if matches!(record.target, DeletionTarget::Container { .. }) {
            self.records.retain(|r| r.target.dog_id() != dog_id);
        }
        self.records.push(record);
        self.records.sort_by_key(|r| (r.target.group(), r.deleted_at));
        true
    }

    /// The next record to replay.
    pub fn head(&self) -> Option<&DeletionRecord> {
        self.records.first()
    }

    /// Removes the record for `target`. Returns true if one was queued.
    pub fn remove(&mut self, target: &DeletionTarget) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.target != *target);
        self.records.len() != before
    }

    pub fn contains(&self, target: &DeletionTarget) -> bool {
        self.records.iter().any(|r| r.target == *target)
    }

    /// True if the dog itself or the given child of it is queued for deletion.
    pub fn covers(&self, target: &DeletionTarget) -> bool {
        self.contains(target) || self.contains(&DeletionTarget::dog(target.dog_id()))
    }

    pub fn records(&self) -> &[DeletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "deletion_tests.rs"]
mod tests;
