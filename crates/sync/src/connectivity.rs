// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host reachability.
//!
//! The host's network layer reports transitions with
//! [`ConnectivityMonitor::set_connected`]; the driver waits on an observer
//! instead of polling.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared reachability flag with change notification.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(connected: bool) -> Self {
        let (tx, _rx) = watch::channel(connected);
        ConnectivityMonitor { tx: Arc::new(tx) }
    }

    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records the current reachability. Observers wake only on a change.
    pub fn set_connected(&self, connected: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == connected {
                return false;
            }
            *current = connected;
            true
        });
        if changed {
            tracing::info!(connected, "connectivity changed");
        }
    }

    /// Subscribes to the next transition to reachable.
    pub fn observe(&self) -> ConnectivityObserver {
        ConnectivityObserver { rx: self.tx.subscribe() }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One-shot subscription to "became connected".
#[derive(Debug)]
pub struct ConnectivityObserver {
    rx: watch::Receiver<bool>,
}

impl ConnectivityObserver {
    /// Resolves once the host is reachable (immediately if it already is).
    ///
    /// Consumes the observer, so the subscription is torn down as soon as it
    /// fires or the future is dropped. Returns false only if the monitor
    /// itself went away.
    pub async fn became_connected(mut self) -> bool {
        self.rx.wait_for(|connected| *connected).await.is_ok()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
