// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline bookkeeping embedded in every syncable entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dog::Dog;
use crate::dog_log::Log;
use crate::reminder::Reminder;

/// Tracks whether an entity has local state the server has not confirmed.
///
/// `needs_sync` is the only signal the engine consults. It is raised by local
/// edit handlers and lowered only when the server gives a definitive answer
/// (success or explicit failure) for this entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineComponents {
    #[serde(default)]
    pub needs_sync: bool,
    /// Set once, when the entity is first created locally.
    pub initial_creation_date: DateTime<Utc>,
    /// Set when a sync is first queued; cleared when the sync is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_attempted_sync_date: Option<DateTime<Utc>>,
}

impl OfflineComponents {
    /// Bookkeeping for an entity created at `created_at` with nothing pending.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        OfflineComponents {
            needs_sync: false,
            initial_creation_date: created_at,
            initial_attempted_sync_date: None,
        }
    }

    /// Flags the entity dirty. The first-attempt date is only stamped once per
    /// pending cycle so repeated edits don't push the entity to the back of
    /// the queue.
    pub fn mark_needs_sync(&mut self, now: DateTime<Utc>) {
        self.needs_sync = true;
        self.initial_attempted_sync_date.get_or_insert(now);
    }

    /// Clears the dirty flag after a definitive server response.
    pub fn mark_resolved(&mut self) {
        self.needs_sync = false;
        self.initial_attempted_sync_date = None;
    }

    /// Ordering key within a scanner tier: oldest-queued first.
    pub fn sync_order_key(&self) -> DateTime<Utc> {
        self.initial_attempted_sync_date.unwrap_or(self.initial_creation_date)
    }
}

/// Common view over dogs, reminders and logs.
pub trait Syncable {
    /// Stable client-side identity.
    fn uuid(&self) -> Uuid;
    fn set_uuid(&mut self, uuid: Uuid);
    /// Server-assigned id, if the server has created the entity.
    fn server_id(&self) -> Option<i64>;
    fn set_server_id(&mut self, id: i64);
    fn offline(&self) -> &OfflineComponents;
    fn offline_mut(&mut self) -> &mut OfflineComponents;

    /// Same entity: equal server ids when both are known, else equal uuids.
    fn same_entity(&self, other: &Self) -> bool {
        match (self.server_id(), other.server_id()) {
            (Some(a), Some(b)) => a == b,
            _ => self.uuid() == other.uuid(),
        }
    }
}

macro_rules! impl_syncable {
    ($ty:ty, $id:ident) => {
        impl Syncable for $ty {
            fn uuid(&self) -> Uuid {
                self.uuid
            }

            fn set_uuid(&mut self, uuid: Uuid) {
                self.uuid = uuid;
            }

            fn server_id(&self) -> Option<i64> {
                self.$id
            }

            fn set_server_id(&mut self, id: i64) {
                self.$id = Some(id);
            }

            fn offline(&self) -> &OfflineComponents {
                &self.offline
            }

            fn offline_mut(&mut self) -> &mut OfflineComponents {
                &mut self.offline
            }
        }
    };
}

impl_syncable!(Dog, dog_id);
impl_syncable!(Reminder, reminder_id);
impl_syncable!(Log, log_id);

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
