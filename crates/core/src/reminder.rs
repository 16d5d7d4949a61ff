// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recurring care reminders attached to a dog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::offline::OfflineComponents;

/// A recurring reminder ("feed", "walk", "medicine") for one dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Stable client-side identity.
    pub uuid: Uuid,
    /// Server-assigned id; `None` until the server has created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<i64>,
    pub action: String,
    pub execution_interval_secs: u64,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    pub offline: OfflineComponents,
}

fn default_enabled() -> bool {
    true
}

impl Reminder {
    /// Creates an unborn reminder.
    pub fn new(
        action: impl Into<String>,
        execution_interval_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Reminder {
            uuid: Uuid::new_v4(),
            reminder_id: None,
            action: action.into(),
            execution_interval_secs,
            is_enabled: true,
            offline: OfflineComponents::new(now),
        }
    }

    /// True when the user-visible fields match, ignoring ids and bookkeeping.
    pub fn same_content(&self, other: &Reminder) -> bool {
        self.action == other.action
            && self.execution_interval_secs == other.execution_interval_secs
            && self.is_enabled == other.is_enabled
    }
}
