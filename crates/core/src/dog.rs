// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Dogs: the containers of the entity tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dog_log::Log;
use crate::offline::OfflineComponents;
use crate::reminder::Reminder;

/// A dog and everything recorded for it.
///
/// The dog must exist server-side before its reminders and logs can be
/// pushed, since children reference their parent by `dog_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    /// Stable client-side identity.
    pub uuid: Uuid,
    /// Server-assigned id; `None` until the server has created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dog_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub logs: Vec<Log>,
    pub offline: OfflineComponents,
}

impl Dog {
    /// Creates an unborn dog with no reminders or logs.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Dog {
            uuid: Uuid::new_v4(),
            dog_id: None,
            name: name.into(),
            reminders: Vec::new(),
            logs: Vec::new(),
            offline: OfflineComponents::new(now),
        }
    }

    /// True when the dog's own fields match, ignoring children, ids and
    /// bookkeeping.
    pub fn same_content(&self, other: &Dog) -> bool {
        self.name == other.name
    }

    pub fn reminder(&self, uuid: Uuid) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.uuid == uuid)
    }

    pub fn reminder_mut(&mut self, uuid: Uuid) -> Option<&mut Reminder> {
        self.reminders.iter_mut().find(|r| r.uuid == uuid)
    }

    pub fn log(&self, uuid: Uuid) -> Option<&Log> {
        self.logs.iter().find(|l| l.uuid == uuid)
    }

    pub fn log_mut(&mut self, uuid: Uuid) -> Option<&mut Log> {
        self.logs.iter_mut().find(|l| l.uuid == uuid)
    }

    /// Removes a reminder by client identity.
    pub fn remove_reminder(&mut self, uuid: Uuid) -> Option<Reminder> {
        let index = self.reminders.iter().position(|r| r.uuid == uuid)?;
        Some(self.reminders.remove(index))
    }

    /// Removes a log by client identity.
    pub fn remove_log(&mut self, uuid: Uuid) -> Option<Log> {
        let index = self.logs.iter().position(|l| l.uuid == uuid)?;
        Some(self.logs.remove(index))
    }

    /// Removes a reminder by server id.
    pub fn remove_reminder_by_id(&mut self, reminder_id: i64) -> Option<Reminder> {
        let index = self.reminders.iter().position(|r| r.reminder_id == Some(reminder_id))?;
        Some(self.reminders.remove(index))
    }

    /// Removes a log by server id.
    pub fn remove_log_by_id(&mut self, log_id: i64) -> Option<Log> {
        let index = self.logs.iter().position(|l| l.log_id == Some(log_id))?;
        Some(self.logs.remove(index))
    }
}
