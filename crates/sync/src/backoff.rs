// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry scheduling.
//!
//! A no-response suspends the episode; the driver arms a single wakeup that
//! re-enters [`crate::SyncDriver::start_monitoring`] after a fixed delay.
//! Waiting for connectivity uses the same slot, so at most one wakeup of
//! either kind is ever pending.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;

/// Delay between a no-response and the next episode.
///
/// The delay is constant; repeated no-responses retry at a steady cadence
/// rather than backing off exponentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(15);

    pub fn fixed(delay: Duration) -> Self {
        RetryPolicy { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::fixed(Self::DEFAULT_DELAY)
    }
}

impl From<&SyncConfig> for RetryPolicy {
    fn from(config: &SyncConfig) -> Self {
        RetryPolicy::fixed(config.retry_delay())
    }
}

/// Holds the one pending wakeup, if any.
#[derive(Debug, Default)]
pub(crate) struct WakeupSlot {
    pending: Mutex<Option<CancellationToken>>,
}

impl WakeupSlot {
    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `wake` once `trigger` resolves to true, replacing (and
    /// cancelling) any previously armed wakeup.
    ///
    /// Dropping the trigger on cancellation releases whatever it holds, such
    /// as a connectivity observer.
    pub(crate) fn arm<F, W>(&self, trigger: F, wake: W)
    where
        F: Future<Output = bool> + Send + 'static,
        W: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }

        tokio::spawn(async move {
            let fired = tokio::select! {
                _ = token.cancelled() => false,
                fired = trigger => fired,
            };
            if fired && !token.is_cancelled() {
                token.cancel();
                wake();
            }
        });
    }

    /// Cancels the pending wakeup. Returns true if one was still live.
    pub(crate) fn disarm(&self) -> bool {
        match self.lock().take() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.lock().as_ref().is_some_and(|token| !token.is_cancelled())
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
