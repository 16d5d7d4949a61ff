// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide resynchronization flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A class of state that needs to be pushed to or pulled from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResyncClass {
    PushUser,
    PullUser,
    PullFamily,
    PullEntityTree,
}

impl ResyncClass {
    /// All classes in the order the engine honors them.
    pub const ALL: [ResyncClass; 4] = [
        ResyncClass::PushUser,
        ResyncClass::PullUser,
        ResyncClass::PullFamily,
        ResyncClass::PullEntityTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResyncClass::PushUser => "push-user",
            ResyncClass::PullUser => "pull-user",
            ResyncClass::PullFamily => "pull-family",
            ResyncClass::PullEntityTree => "pull-entity-tree",
        }
    }
}

impl fmt::Display for ResyncClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResyncClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResyncClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| Error::InvalidResyncClass(s.to_string()))
    }
}

/// Pending push/pull flags.
///
/// `needs_push_user_profile` is always honored before `needs_pull_user`;
/// pulling first would overwrite an unsynced local edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncFlags {
    pub needs_push_user_profile: bool,
    pub needs_pull_user: bool,
    pub needs_pull_family: bool,
    pub needs_pull_entity_tree: bool,
}

impl SyncFlags {
    pub fn is_set(&self, class: ResyncClass) -> bool {
        match class {
            ResyncClass::PushUser => self.needs_push_user_profile,
            ResyncClass::PullUser => self.needs_pull_user,
            ResyncClass::PullFamily => self.needs_pull_family,
            ResyncClass::PullEntityTree => self.needs_pull_entity_tree,
        }
    }

    /// Sets or clears a flag. Returns true if the value changed.
    pub fn set(&mut self, class: ResyncClass, value: bool) -> bool {
        let slot = match class {
            ResyncClass::PushUser => &mut self.needs_push_user_profile,
            ResyncClass::PullUser => &mut self.needs_pull_user,
            ResyncClass::PullFamily => &mut self.needs_pull_family,
            ResyncClass::PullEntityTree => &mut self.needs_pull_entity_tree,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// The highest-priority flag that is set.
    pub fn first_pending(&self) -> Option<ResyncClass> {
        ResyncClass::ALL.into_iter().find(|class| self.is_set(*class))
    }

    pub fn any(&self) -> bool {
        self.first_pending().is_some()
    }
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
