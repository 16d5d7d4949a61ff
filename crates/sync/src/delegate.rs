// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pawsync_core::{EntityTree, Family, UserProfile};

/// Presentation-layer callbacks.
///
/// Called from the driver's task; implementations must not block. Calling
/// back into [`crate::SyncDriver::start_monitoring`] from a callback is
/// allowed.
pub trait SyncDelegate: Send + Sync {
    /// The engine started working through pending changes. Fired once per
    /// episode, not per failed call.
    fn on_offline_mode_entered(&self) {}

    /// The authoritative entity tree changed (pull, deletion replay, or a
    /// server id assigned after create), or an episode completed.
    fn on_entity_tree_updated(&self, tree: &EntityTree);

    fn on_user_updated(&self, _user: &UserProfile) {}

    fn on_family_updated(&self, _family: &Family) {}
}

/// Delegate that ignores every notification.
#[derive(Debug, Default)]
pub struct NoopDelegate;

impl SyncDelegate for NoopDelegate {
    fn on_entity_tree_updated(&self, _tree: &EntityTree) {}
}
