// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Care logs ("fed at 8am") recorded against a dog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::offline::OfflineComponents;

/// A single logged care event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Stable client-side identity.
    pub uuid: Uuid,
    /// Server-assigned id; `None` until the server has created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<i64>,
    pub action: String,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    pub offline: OfflineComponents,
}

impl Log {
    /// Creates an unborn log starting at `start_date`.
    pub fn new(action: impl Into<String>, start_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Log {
            uuid: Uuid::new_v4(),
            log_id: None,
            action: action.into(),
            start_date,
            end_date: None,
            note: String::new(),
            offline: OfflineComponents::new(now),
        }
    }

    /// True when the user-visible fields match, ignoring ids and bookkeeping.
    pub fn same_content(&self, other: &Log) -> bool {
        self.action == other.action
            && self.start_date == other.start_date
            && self.end_date == other.end_date
            && self.note == other.note
    }
}
