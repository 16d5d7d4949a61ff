// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync driver: one episode at a time, one remote call at a time.
//!
//! State machine:
//!
//! ```text
//!            start_monitoring (work pending)
//!   Idle ──────────────────────────────┬──────────────► Syncing ──► Idle
//!    ▲                                 │ offline          │  │   (nothing left)
//!    │                                 ▼                  │  │
//!    │                   WaitingForConnectivity ──────────┘  │ no response
//!    │                        (became connected)             ▼
//!    └──────────────────────────────────────────────── BackoffDelay
//!                 (fixed delay elapsed, re-enters start_monitoring)
//! ```
//!
//! An episode is an explicit loop over [`crate::next_unit`]; each iteration
//! awaits exactly one remote call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use pawsync_core::{DeletionRecord, DeletionTarget, ResyncClass, SubItemKind};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backoff::{RetryPolicy, WakeupSlot};
use crate::connectivity::ConnectivityMonitor;
use crate::delegate::SyncDelegate;
use crate::error::Result;
use crate::outcome::Outcome;
use crate::remote::RemoteApi;
use crate::scanner::DirtyEntity;
use crate::session::SyncSession;
use crate::unit::SyncUnit;

/// Where the driver is in its episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
    WaitingForConnectivity,
    BackoffDelay,
}

/// How a spawned episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// Nothing was left to sync; the final tree was published.
    Completed,
    /// A call went unanswered; a retry is scheduled.
    Backoff,
}

/// What [`SyncDriver::start_monitoring`] did.
#[derive(Debug)]
pub enum StartOutcome {
    /// An episode is already syncing.
    AlreadyRunning,
    /// The ledger holds no pending work.
    NothingPending,
    /// Offline; the episode resumes when connectivity returns.
    WaitingForConnectivity,
    /// An episode was spawned.
    Started(JoinHandle<EpisodeEnd>),
}

impl StartOutcome {
    pub fn into_handle(self) -> Option<JoinHandle<EpisodeEnd>> {
        match self {
            StartOutcome::Started(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Result of performing one unit.
enum Step {
    /// Definitive response recorded; move on.
    Handled,
    /// No response; suspend the episode.
    Suspend,
}

/// Replays pending local state through a [`RemoteApi`].
///
/// Cheap to clone; clones drive the same episode.
pub struct SyncDriver<R: RemoteApi + 'static> {
    inner: Arc<DriverInner<R>>,
}

impl<R: RemoteApi + 'static> Clone for SyncDriver<R> {
    fn clone(&self) -> Self {
        SyncDriver { inner: Arc::clone(&self.inner) }
    }
}

struct DriverInner<R> {
    remote: R,
    session: Arc<SyncSession>,
    connectivity: ConnectivityMonitor,
    delegate: Arc<dyn SyncDelegate>,
    policy: RetryPolicy,
    state: watch::Sender<SyncState>,
    /// Serializes state transitions.
    gate: Mutex<()>,
    /// Offline banner already shown this episode.
    banner_shown: AtomicBool,
    wakeup: WakeupSlot,
}

impl<R: RemoteApi + 'static> SyncDriver<R> {
    pub fn new(
        remote: R,
        session: Arc<SyncSession>,
        connectivity: ConnectivityMonitor,
        delegate: Arc<dyn SyncDelegate>,
        policy: RetryPolicy,
    ) -> Self {
        let (state, _rx) = watch::channel(SyncState::Idle);
        SyncDriver {
            inner: Arc::new(DriverInner {
                remote,
                session,
                connectivity,
                delegate,
                policy,
                state,
                gate: Mutex::new(()),
                banner_shown: AtomicBool::new(false),
                wakeup: WakeupSlot::default(),
            }),
        }
    }

    /// Entry point: starts an episode if there is pending work.
    ///
    /// Safe to call any number of times; at most one episode runs. From
    /// `BackoffDelay` the pending retry is cancelled and work resumes now.
    /// Must be called from within a tokio runtime.
    pub fn start_monitoring(&self) -> StartOutcome {
        self.inner.start()
    }

    pub fn state(&self) -> SyncState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Drops the pending wakeup, as happens when a connectivity observer
    /// fires and the link is lost again before the driver re-enters.
    #[cfg(test)]
    pub(crate) fn drop_wakeup(&self) -> bool {
        self.inner.wakeup.disarm()
    }
}

impl<R: RemoteApi + 'static> DriverInner<R> {
    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: SyncState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(?previous, ?next, "sync state changed");
        }
    }

    fn start(self: &Arc<Self>) -> StartOutcome {
        let gate = self.lock_gate();
        let connected = self.connectivity.is_connected();
        match *self.state.borrow() {
            SyncState::Syncing => return StartOutcome::AlreadyRunning,
            // The observer may already have fired on a brief reconnect; in
            // that case fall through and watch again.
            SyncState::WaitingForConnectivity if !connected && self.wakeup.is_armed() => {
                return StartOutcome::WaitingForConnectivity;
            }
            _ => {}
        }
        if self.wakeup.disarm() {
            tracing::debug!("pending wakeup cancelled");
        }

        if !self.session.has_pending_work() {
            self.set_state(SyncState::Idle);
            return StartOutcome::NothingPending;
        }
        let announce = !self.banner_shown.swap(true, Ordering::SeqCst);

        let outcome = if connected {
            self.set_state(SyncState::Syncing);
            let driver = Arc::clone(self);
            StartOutcome::Started(tokio::spawn(driver.run_episode()))
        } else {
            tracing::info!("offline with pending changes, waiting for connectivity");
            self.set_state(SyncState::WaitingForConnectivity);
            let observer = self.connectivity.observe();
            let driver = Arc::clone(self);
            self.wakeup.arm(observer.became_connected(), move || {
                driver.start();
            });
            StartOutcome::WaitingForConnectivity
        };
        drop(gate);

        if announce {
            self.delegate.on_offline_mode_entered();
        }
        outcome
    }

    async fn run_episode(self: Arc<Self>) -> EpisodeEnd {
        tracing::info!("sync episode started");
        loop {
            let Some(unit) = self.session.next_unit() else {
                if self.finish_if_idle() {
                    self.publish_tree();
                    tracing::info!("sync episode complete");
                    return EpisodeEnd::Completed;
                }
                continue;
            };

            tracing::debug!(%unit, "syncing");
            match self.perform(&unit).await {
                Ok(Step::Handled) => {}
                Ok(Step::Suspend) => {
                    self.back_off();
                    return EpisodeEnd::Backoff;
                }
                Err(e) => {
                    tracing::error!(%unit, error = %e, "failed to record sync result");
                    self.back_off();
                    return EpisodeEnd::Backoff;
                }
            }
        }
    }

    /// Ends the episode unless work arrived since the last scan.
    fn finish_if_idle(&self) -> bool {
        let _gate = self.lock_gate();
        if self.session.has_pending_work() {
            return false;
        }
        self.banner_shown.store(false, Ordering::SeqCst);
        self.set_state(SyncState::Idle);
        true
    }

    fn back_off(self: &Arc<Self>) {
        let _gate = self.lock_gate();
        let delay = self.policy.delay();
        tracing::warn!(delay_secs = delay.as_secs(), "no response from server, retrying later");
        self.set_state(SyncState::BackoffDelay);
        let driver = Arc::clone(self);
        self.wakeup.arm(
            async move {
                tokio::time::sleep(delay).await;
                true
            },
            move || {
                driver.start();
            },
        );
    }

    fn publish_tree(&self) {
        self.delegate.on_entity_tree_updated(&self.session.tree());
    }

    async fn perform(&self, unit: &SyncUnit) -> Result<Step> {
        match unit {
            SyncUnit::Resync(class) => self.resync(unit, *class).await,
            SyncUnit::ReplayDeletion(record) => self.replay_deletion(unit, record).await,
            SyncUnit::Entity(entity) => self.push_entity(unit, *entity).await,
        }
    }

    async fn resync(&self, unit: &SyncUnit, class: ResyncClass) -> Result<Step> {
        match class {
            ResyncClass::PushUser => {
                let sent = self.session.user_profile();
                let outcome = self.remote.update_user(sent.clone()).await;
                if definitive(unit, outcome).is_none() {
                    return Ok(Step::Suspend);
                }
                self.session.settle_user_push(&sent)?;
            }
            ResyncClass::PullUser => {
                let Some(user) = definitive(unit, self.remote.get_user().await) else {
                    return Ok(Step::Suspend);
                };
                if let Some(user) = user {
                    if self.session.apply_pulled_user(user.clone())? {
                        self.delegate.on_user_updated(&user);
                    }
                }
                self.session.resolve(class)?;
            }
            ResyncClass::PullFamily => {
                let Some(family) = definitive(unit, self.remote.get_family().await) else {
                    return Ok(Step::Suspend);
                };
                if let Some(family) = family {
                    self.session.apply_pulled_family(family.clone())?;
                    self.delegate.on_family_updated(&family);
                }
                self.session.resolve(class)?;
            }
            ResyncClass::PullEntityTree => {
                let known = self.session.tree();
                let Some(pulled) = definitive(unit, self.remote.get_entity_tree(known).await) else {
                    return Ok(Step::Suspend);
                };
                if let Some(pulled) = pulled {
                    let merged = self.session.apply_pulled_tree(pulled)?;
                    self.delegate.on_entity_tree_updated(&merged);
                }
                self.session.resolve(class)?;
            }
        }
        Ok(Step::Handled)
    }

    async fn replay_deletion(&self, unit: &SyncUnit, record: &DeletionRecord) -> Result<Step> {
        let outcome = match record.target {
            DeletionTarget::Container { dog_id } => self.remote.delete_dog(dog_id).await,
            DeletionTarget::SubItem { item: SubItemKind::Reminder, dog_id, item_id } => {
                self.remote.delete_reminder(dog_id, item_id).await
            }
            DeletionTarget::SubItem { item: SubItemKind::Log, dog_id, item_id } => {
                self.remote.delete_log(dog_id, item_id).await
            }
        };
        if definitive(unit, outcome).is_none() {
            return Ok(Step::Suspend);
        }
        if self.session.complete_deletion(&record.target)? {
            self.publish_tree();
        }
        Ok(Step::Handled)
    }

    /// Creates or updates one dirty entity. Whether to create is decided by
    /// the presence of a server id alone, so a create that completed on an
    /// earlier attempt is replayed as an update.
    async fn push_entity(&self, unit: &SyncUnit, entity: DirtyEntity) -> Result<Step> {
        let assigned = match entity {
            DirtyEntity::Dog { dog } => {
                let Some(sent) = self.session.dog_payload(dog) else {
                    return Ok(Step::Handled);
                };
                let outcome = match sent.dog_id {
                    Some(_) => self.remote.update_dog(sent.clone()).await.map(|()| None),
                    None => self.remote.create_dog(sent.clone()).await.map(Some),
                };
                let Some(result) = definitive(unit, outcome) else {
                    return Ok(Step::Suspend);
                };
                self.session.settle_dog(&sent, result.flatten())?
            }
            DirtyEntity::Reminder { dog, reminder } => {
                let Some((dog_id, sent)) = self.session.reminder_payload(dog, reminder) else {
                    return Ok(Step::Handled);
                };
                let Some(dog_id) = dog_id else {
                    return self.orphaned(entity);
                };
                let outcome = match sent.reminder_id {
                    Some(_) => {
                        let batch = vec![sent.clone()];
                        self.remote.update_reminders(dog_id, batch).await.map(|()| None)
                    }
                    None => match self.remote.create_reminders(dog_id, vec![sent.clone()]).await {
                        Outcome::Success(ids) => match ids.into_iter().next() {
                            Some(id) => Outcome::Success(Some(id)),
                            None => Outcome::failure("create succeeded without a reminder id"),
                        },
                        other => other.map(|_| None),
                    },
                };
                let Some(result) = definitive(unit, outcome) else {
                    return Ok(Step::Suspend);
                };
                self.session.settle_reminder(dog, dog_id, &sent, result.flatten())?
            }
            DirtyEntity::Log { dog, log } => {
                let Some((dog_id, sent)) = self.session.log_payload(dog, log) else {
                    return Ok(Step::Handled);
                };
                let Some(dog_id) = dog_id else {
                    return self.orphaned(entity);
                };
                let outcome = match sent.log_id {
                    Some(_) => self.remote.update_log(dog_id, sent.clone()).await.map(|()| None),
                    None => self.remote.create_log(dog_id, sent.clone()).await.map(Some),
                };
                let Some(result) = definitive(unit, outcome) else {
                    return Ok(Step::Suspend);
                };
                self.session.settle_log(dog, dog_id, &sent, result.flatten())?
            }
        };
        if assigned {
            self.publish_tree();
        }
        Ok(Step::Handled)
    }

    /// A dirty child whose dog has no server id can never be pushed.
    fn orphaned(&self, entity: DirtyEntity) -> Result<Step> {
        tracing::error!(%entity, "dog was never created on the server, dropping child sync");
        self.session.abandon(entity)?;
        Ok(Step::Handled)
    }
}

/// `None` for no response; otherwise the payload of a success, or `None`
/// inside for a failure (which is logged and treated as handled).
fn definitive<T>(unit: &SyncUnit, outcome: Outcome<T>) -> Option<Option<T>> {
    match outcome {
        Outcome::Success(value) => Some(Some(value)),
        Outcome::Failure(reason) => {
            tracing::warn!(%unit, %reason, "server rejected sync unit, treating as handled");
            Some(None)
        }
        Outcome::NoResponse => {
            tracing::debug!(%unit, "no response");
            None
        }
    }
}
