// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pawsync-core: Shared data model for the pawsync offline engine
//!
//! This crate provides the entity tree (dogs with their reminders and logs),
//! the offline bookkeeping embedded in every syncable entity, the deletion
//! outbox, the process-wide sync flags, and the on-disk snapshot format used
//! by both the sync engine and the `pawsync` CLI.

pub mod clock;
pub mod deletion;
pub mod dog;
pub mod dog_log;
pub mod error;
pub mod flags;
pub mod jsonl;
pub mod offline;
pub mod reminder;
pub mod snapshot;
pub mod tree;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use deletion::{DeletionRecord, DeletionTarget, Outbox, SubItemKind};
pub use dog::Dog;
pub use dog_log::Log;
pub use error::{Error, Result};
pub use flags::{ResyncClass, SyncFlags};
pub use offline::{OfflineComponents, Syncable};
pub use reminder::Reminder;
pub use snapshot::{ProfileSnapshot, StateDir};
pub use tree::{DirtyCounts, EntityTree};
pub use user::{Family, FamilyMember, InterfaceStyle, UserConfiguration, UserProfile};
