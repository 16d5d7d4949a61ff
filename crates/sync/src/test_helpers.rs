// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the driver tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use pawsync_core::{Dog, EntityTree, Family, Log, Reminder, UserProfile};
use uuid::Uuid;

use crate::delegate::SyncDelegate;
use crate::outcome::Outcome;
use crate::remote::{RemoteApi, RemoteFuture};

/// A call the engine made against the mock, with enough payload to tell a
/// verbatim retry from a different request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    UpdateUser { first_name: String },
    GetUser,
    GetFamily,
    GetEntityTree,
    CreateDog { uuid: Uuid, name: String },
    UpdateDog { dog_id: i64, name: String },
    DeleteDog { dog_id: i64 },
    CreateReminders { dog_id: i64, actions: Vec<String> },
    UpdateReminders { dog_id: i64, reminder_ids: Vec<Option<i64>> },
    DeleteReminder { dog_id: i64, reminder_id: i64 },
    CreateLog { dog_id: i64, action: String },
    UpdateLog { dog_id: i64, log_id: Option<i64> },
    DeleteLog { dog_id: i64, log_id: i64 },
}

/// Scripted reply for the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Success,
    Failure,
    NoResponse,
}

type Hook = Arc<dyn Fn(&RemoteCall) + Send + Sync>;

struct MockState {
    calls: Vec<RemoteCall>,
    replies: VecDeque<Reply>,
    next_id: i64,
    user: UserProfile,
    family: Family,
    tree: Option<EntityTree>,
    on_call: Option<Hook>,
    withhold_ids: bool,
}

/// Records every call and answers from a reply script, succeeding once the
/// script runs out. Server ids are handed out from 100 upwards.
#[derive(Clone)]
pub struct MockRemote {
    state: Arc<Mutex<MockState>>,
}

impl MockRemote {
    pub fn new() -> Self {
        MockRemote {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                replies: VecDeque::new(),
                next_id: 100,
                user: UserProfile::default(),
                family: Family::default(),
                tree: None,
                on_call: None,
                withhold_ids: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Queue replies for the next calls, in order.
    pub fn script(&self, replies: &[Reply]) {
        self.lock().replies.extend(replies.iter().copied());
    }

    pub fn set_user(&self, user: UserProfile) {
        self.lock().user = user;
    }

    pub fn set_family(&self, family: Family) {
        self.lock().family = family;
    }

    /// Tree returned by a pull; by default the pull echoes the known tree.
    pub fn set_tree(&self, tree: EntityTree) {
        self.lock().tree = Some(tree);
    }

    /// Runs `hook` synchronously as each call is issued, i.e. while the call
    /// is in flight from the engine's point of view.
    pub fn on_call(&self, hook: impl Fn(&RemoteCall) + Send + Sync + 'static) {
        self.lock().on_call = Some(Arc::new(hook));
    }

    /// Successful reminder creates return no ids.
    pub fn withhold_reminder_ids(&self) {
        self.lock().withhold_ids = true;
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    fn respond<T, F>(&self, call: RemoteCall, success: F) -> RemoteFuture<'_, T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MockState) -> T,
    {
        let (reply, hook) = {
            let mut state = self.lock();
            state.calls.push(call.clone());
            (state.replies.pop_front().unwrap_or(Reply::Success), state.on_call.clone())
        };
        if let Some(hook) = hook {
            hook(&call);
        }
        let outcome = match reply {
            Reply::Success => Outcome::Success(success(&mut *self.lock())),
            Reply::Failure => Outcome::failure("rejected by mock"),
            Reply::NoResponse => Outcome::NoResponse,
        };
        Box::pin(async move {
            tokio::task::yield_now().await;
            outcome
        })
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn allocate_id(state: &mut MockState) -> i64 {
    let id = state.next_id;
    state.next_id += 1;
    id
}

impl RemoteApi for MockRemote {
    fn update_user(&self, profile: UserProfile) -> RemoteFuture<'_, ()> {
        self.respond(RemoteCall::UpdateUser { first_name: profile.first_name }, |_| ())
    }

    fn get_user(&self) -> RemoteFuture<'_, UserProfile> {
        self.respond(RemoteCall::GetUser, |state| state.user.clone())
    }

    fn get_family(&self) -> RemoteFuture<'_, Family> {
        self.respond(RemoteCall::GetFamily, |state| state.family.clone())
    }

    fn get_entity_tree(&self, known: EntityTree) -> RemoteFuture<'_, EntityTree> {
        self.respond(RemoteCall::GetEntityTree, move |state| state.tree.clone().unwrap_or(known))
    }

    fn create_dog(&self, dog: Dog) -> RemoteFuture<'_, i64> {
        self.respond(RemoteCall::CreateDog { uuid: dog.uuid, name: dog.name }, allocate_id)
    }

    fn update_dog(&self, dog: Dog) -> RemoteFuture<'_, ()> {
        let dog_id = dog.dog_id.unwrap();
        self.respond(RemoteCall::UpdateDog { dog_id, name: dog.name }, |_| ())
    }

    fn delete_dog(&self, dog_id: i64) -> RemoteFuture<'_, ()> {
        self.respond(RemoteCall::DeleteDog { dog_id }, |_| ())
    }

    fn create_reminders(
        &self,
        dog_id: i64,
        reminders: Vec<Reminder>,
    ) -> RemoteFuture<'_, Vec<i64>> {
        let count = reminders.len();
        let actions = reminders.into_iter().map(|r| r.action).collect();
        self.respond(RemoteCall::CreateReminders { dog_id, actions }, move |state| {
            if state.withhold_ids {
                return Vec::new();
            }
            (0..count).map(|_| allocate_id(state)).collect()
        })
    }

    fn update_reminders(&self, dog_id: i64, reminders: Vec<Reminder>) -> RemoteFuture<'_, ()> {
        let reminder_ids = reminders.iter().map(|r| r.reminder_id).collect();
        self.respond(RemoteCall::UpdateReminders { dog_id, reminder_ids }, |_| ())
    }

    fn delete_reminder(&self, dog_id: i64, reminder_id: i64) -> RemoteFuture<'_, ()> {
        self.respond(RemoteCall::DeleteReminder { dog_id, reminder_id }, |_| ())
    }

    fn create_log(&self, dog_id: i64, log: Log) -> RemoteFuture<'_, i64> {
        self.respond(RemoteCall::CreateLog { dog_id, action: log.action }, allocate_id)
    }

    fn update_log(&self, dog_id: i64, log: Log) -> RemoteFuture<'_, ()> {
        self.respond(RemoteCall::UpdateLog { dog_id, log_id: log.log_id }, |_| ())
    }

    fn delete_log(&self, dog_id: i64, log_id: i64) -> RemoteFuture<'_, ()> {
        self.respond(RemoteCall::DeleteLog { dog_id, log_id }, |_| ())
    }
}

/// Records every delegate notification.
#[derive(Default)]
pub struct RecordingDelegate {
    banners: AtomicUsize,
    trees: Mutex<Vec<EntityTree>>,
    users: Mutex<Vec<UserProfile>>,
    families: Mutex<Vec<Family>>,
}

impl RecordingDelegate {
    pub fn banners(&self) -> usize {
        self.banners.load(Ordering::SeqCst)
    }

    pub fn trees(&self) -> Vec<EntityTree> {
        self.trees.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<UserProfile> {
        self.users.lock().unwrap().clone()
    }

    pub fn families(&self) -> Vec<Family> {
        self.families.lock().unwrap().clone()
    }
}

impl SyncDelegate for RecordingDelegate {
    fn on_offline_mode_entered(&self) {
        self.banners.fetch_add(1, Ordering::SeqCst);
    }

    fn on_entity_tree_updated(&self, tree: &EntityTree) {
        self.trees.lock().unwrap().push(tree.clone());
    }

    fn on_user_updated(&self, user: &UserProfile) {
        self.users.lock().unwrap().push(user.clone());
    }

    fn on_family_updated(&self, family: &Family) {
        self.families.lock().unwrap().push(family.clone());
    }
}
