// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end episodes against the scripted remote.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use pawsync_core::{
    DeletionRecord, DeletionTarget, Dog, EntityTree, Family, FamilyMember, Log, ManualClock,
    Reminder,
    ResyncClass, UserProfile,
};
use tokio::time::Instant;

use crate::backoff::RetryPolicy;
use crate::connectivity::ConnectivityMonitor;
use crate::driver::{EpisodeEnd, StartOutcome, SyncDriver, SyncState};
use crate::session::SyncSession;
use crate::test_helpers::{MockRemote, RecordingDelegate, RemoteCall, Reply};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

struct Harness {
    remote: MockRemote,
    session: Arc<SyncSession>,
    connectivity: ConnectivityMonitor,
    delegate: Arc<RecordingDelegate>,
    driver: SyncDriver<MockRemote>,
}

fn harness_with(tree: EntityTree, connected: bool) -> Harness {
    let clock = Arc::new(ManualClock::new(at(1_000)));
    let session = Arc::new(SyncSession::in_memory(clock).with_tree(tree));
    let remote = MockRemote::new();
    let connectivity = ConnectivityMonitor::new(connected);
    let delegate = Arc::new(RecordingDelegate::default());
    let driver = SyncDriver::new(
        remote.clone(),
        Arc::clone(&session),
        connectivity.clone(),
        delegate.clone(),
        RetryPolicy::default(),
    );
    Harness { remote, session, connectivity, delegate, driver }
}

fn harness() -> Harness {
    harness_with(EntityTree::default(), true)
}

fn synced_dog(dog_id: i64, name: &str) -> Dog {
    let mut dog = Dog::new(name, at(0));
    dog.dog_id = Some(dog_id);
    dog
}

async fn run(h: &Harness) -> EpisodeEnd {
    h.driver.start_monitoring().into_handle().unwrap().await.unwrap()
}

async fn wait_idle(h: &Harness) {
    let mut rx = h.driver.subscribe_state();
    tokio::time::timeout(Duration::from_secs(120), rx.wait_for(|s| *s == SyncState::Idle))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn documented_scenario_pull_family_then_container_then_log() {
    let mut synced = synced_dog(1, "Fido");
    let mut l1 = Log::new("walk", at(0), at(0));
    l1.offline.mark_needs_sync(at(20));
    synced.logs.push(l1.clone());
    let mut c1 = Dog::new("Rex", at(10));
    c1.offline.needs_sync = true;
    let h = harness_with(EntityTree::new(vec![synced.clone(), c1.clone()]), true);
    h.session.mark_needs_resync(ResyncClass::PullFamily).unwrap();

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::GetFamily,
            RemoteCall::CreateDog { uuid: c1.uuid, name: "Rex".to_string() },
            RemoteCall::CreateLog { dog_id: 1, action: "walk".to_string() },
        ]
    );
    assert!(!h.session.has_pending_work());
    let tree = h.session.tree();
    assert_eq!(tree.dog(c1.uuid).unwrap().dog_id, Some(100));
    assert_eq!(tree.dog(synced.uuid).unwrap().log(l1.uuid).unwrap().log_id, Some(101));
    assert_eq!(h.driver.state(), SyncState::Idle);
}

#[tokio::test]
async fn priority_push_user_first_then_tiers_in_order() {
    let h = harness();
    h.session.mark_needs_resync(ResyncClass::PullFamily).unwrap();
    let dog = h.session.add_dog("Rex").unwrap();
    h.session.add_log(dog, Log::new("walk", at(0), at(0))).unwrap();
    h.session.add_reminder(dog, Reminder::new("feed", 3600, at(0))).unwrap();
    h.session.update_user_profile(|u| u.first_name = "Sam".to_string()).unwrap();

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::UpdateUser { first_name: "Sam".to_string() },
            RemoteCall::GetFamily,
            RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() },
            RemoteCall::CreateReminders { dog_id: 100, actions: vec!["feed".to_string()] },
            RemoteCall::CreateLog { dog_id: 100, action: "walk".to_string() },
        ]
    );
}

#[tokio::test]
async fn push_user_clears_flag_before_pull_user() {
    let h = harness();
    h.remote.set_user(UserProfile { first_name: "Server".to_string(), ..UserProfile::default() });
    h.session.mark_needs_resync(ResyncClass::PullUser).unwrap();
    h.session.update_user_profile(|u| u.first_name = "Local".to_string()).unwrap();

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![RemoteCall::UpdateUser { first_name: "Local".to_string() }, RemoteCall::GetUser]
    );
    assert!(!h.session.flags().any());
    assert_eq!(h.session.user_profile().first_name, "Server");
    assert_eq!(h.delegate.users().len(), 1);
}

#[tokio::test]
async fn pull_family_notifies_delegate() {
    let h = harness();
    let family = Family {
        family_id: Some("fam".to_string()),
        members: vec![FamilyMember {
            user_id: "u1".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Smith".to_string(),
            is_head: true,
        }],
        is_paused: false,
    };
    h.remote.set_family(family.clone());
    h.session.mark_needs_resync(ResyncClass::PullFamily).unwrap();

    run(&h).await;

    assert_eq!(h.session.family(), family);
    assert_eq!(h.delegate.families(), vec![family]);
}

#[tokio::test]
async fn second_start_while_syncing_is_rejected() {
    let h = harness();
    h.session.add_dog("Rex").unwrap();

    let first = h.driver.start_monitoring();
    let second = h.driver.start_monitoring();

    assert!(matches!(second, StartOutcome::AlreadyRunning));
    assert_eq!(first.into_handle().unwrap().await.unwrap(), EpisodeEnd::Completed);
    assert_eq!(h.remote.calls().len(), 1);
}

#[tokio::test]
async fn nothing_pending_stays_idle() {
    let h = harness();

    assert!(matches!(h.driver.start_monitoring(), StartOutcome::NothingPending));

    assert_eq!(h.driver.state(), SyncState::Idle);
    assert_eq!(h.delegate.banners(), 0);
    assert!(h.remote.calls().is_empty());
}

#[tokio::test]
async fn definitive_failure_is_handled_not_retried() {
    let h = harness();
    let dog = h.session.add_dog("Rex").unwrap();
    h.remote.script(&[Reply::Failure]);

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert_eq!(h.remote.calls().len(), 1);
    let tree = h.session.tree();
    let stored = tree.dog(dog).unwrap();
    assert_eq!(stored.dog_id, None);
    assert!(!stored.offline.needs_sync);
    assert!(!h.session.has_pending_work());
}

#[tokio::test(start_paused = true)]
async fn no_response_backs_off_and_retries_create_verbatim() {
    let h = harness();
    let dog = h.session.add_dog("Rex").unwrap();
    h.remote.script(&[Reply::NoResponse]);

    assert_eq!(run(&h).await, EpisodeEnd::Backoff);
    assert_eq!(h.driver.state(), SyncState::BackoffDelay);
    assert_eq!(h.session.pending_entities().len(), 1);

    let suspended = Instant::now();
    wait_idle(&h).await;
    assert!(suspended.elapsed() >= Duration::from_secs(15));

    let calls = h.remote.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0], RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() });
    assert_eq!(h.session.tree().dog(dog).unwrap().dog_id, Some(100));
}

#[tokio::test(start_paused = true)]
async fn no_response_leaves_flags_set() {
    let h = harness();
    h.session.mark_needs_resync(ResyncClass::PullEntityTree).unwrap();
    h.remote.script(&[Reply::NoResponse]);

    assert_eq!(run(&h).await, EpisodeEnd::Backoff);

    assert!(h.session.flags().needs_pull_entity_tree);
}

#[tokio::test(start_paused = true)]
async fn explicit_start_during_backoff_retries_immediately() {
    let h = harness();
    h.session.add_dog("Rex").unwrap();
    h.remote.script(&[Reply::NoResponse]);
    assert_eq!(run(&h).await, EpisodeEnd::Backoff);

    let resumed = Instant::now();
    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert!(resumed.elapsed() < Duration::from_secs(15));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.remote.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn banner_shown_once_per_episode() {
    let h = harness();
    h.session.add_dog("Rex").unwrap();
    h.remote.script(&[Reply::NoResponse, Reply::NoResponse]);

    run(&h).await;
    wait_idle(&h).await;
    assert_eq!(h.remote.calls().len(), 3);
    assert_eq!(h.delegate.banners(), 1);

    h.session.add_dog("Fido").unwrap();
    run(&h).await;
    assert_eq!(h.delegate.banners(), 2);
}

#[tokio::test]
async fn waits_for_connectivity_with_single_observer() {
    let h = harness_with(EntityTree::default(), false);
    let dog = h.session.add_dog("Rex").unwrap();

    assert!(matches!(h.driver.start_monitoring(), StartOutcome::WaitingForConnectivity));
    assert!(matches!(h.driver.start_monitoring(), StartOutcome::WaitingForConnectivity));
    assert_eq!(h.driver.state(), SyncState::WaitingForConnectivity);
    assert_eq!(h.connectivity.observer_count(), 1);
    assert_eq!(h.delegate.banners(), 1);
    assert!(h.remote.calls().is_empty());

    h.connectivity.set_connected(true);
    wait_idle(&h).await;

    assert_eq!(h.connectivity.observer_count(), 0);
    let create = RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() };
    assert_eq!(h.remote.calls(), vec![create]);
    assert_eq!(h.delegate.banners(), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_while_offline_waits_for_connectivity() {
    let h = harness();
    h.session.add_dog("Rex").unwrap();
    h.remote.script(&[Reply::NoResponse]);
    assert_eq!(run(&h).await, EpisodeEnd::Backoff);
    h.connectivity.set_connected(false);

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(h.driver.state(), SyncState::WaitingForConnectivity);
    assert_eq!(h.remote.calls().len(), 1);

    h.connectivity.set_connected(true);
    wait_idle(&h).await;
    assert_eq!(h.remote.calls().len(), 2);
}

#[tokio::test]
async fn start_while_offline_rewatches_after_observer_fired() {
    let h = harness_with(EntityTree::default(), false);
    let dog = h.session.add_dog("Rex").unwrap();
    assert!(matches!(h.driver.start_monitoring(), StartOutcome::WaitingForConnectivity));

    assert!(h.driver.drop_wakeup());
    assert!(matches!(h.driver.start_monitoring(), StartOutcome::WaitingForConnectivity));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(h.connectivity.observer_count(), 1);
    assert_eq!(h.delegate.banners(), 1);

    h.connectivity.set_connected(true);
    wait_idle(&h).await;

    let create = RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() };
    assert_eq!(h.remote.calls(), vec![create]);
    assert!(!h.session.has_pending_work());
}

#[tokio::test]
async fn reminder_create_without_id_is_a_failure() {
    let h = harness_with(EntityTree::new(vec![synced_dog(5, "Rex")]), true);
    let dog = h.session.tree().dogs[0].uuid;
    let reminder = h.session.add_reminder(dog, Reminder::new("feed", 60, at(0))).unwrap();
    h.remote.withhold_reminder_ids();

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert_eq!(
        h.remote.calls(),
        vec![RemoteCall::CreateReminders { dog_id: 5, actions: vec!["feed".to_string()] }]
    );
    let tree = h.session.tree();
    let stored = tree.dog(dog).unwrap().reminder(reminder).unwrap();
    assert_eq!(stored.reminder_id, None);
    assert!(!stored.offline.needs_sync);
    assert!(!h.session.has_pending_work());
}

#[tokio::test]
async fn deletion_replay_precedes_entity_push() {
    let h = harness_with(EntityTree::new(vec![synced_dog(5, "Rex")]), true);
    let dog = h.session.tree().dogs[0].uuid;
    h.session.update_dog(dog, |d| d.name = "Max".to_string()).unwrap();
    h.session
        .enqueue_deletion(DeletionRecord::new(DeletionTarget::log(5, 50), at(0)))
        .unwrap();

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::DeleteLog { dog_id: 5, log_id: 50 },
            RemoteCall::UpdateDog { dog_id: 5, name: "Max".to_string() },
        ]
    );
    assert!(h.session.outbox_records().is_empty());
}

#[tokio::test]
async fn deletion_replay_reapplies_to_reappeared_entity() {
    let tree = EntityTree::new(vec![synced_dog(9, "Ghost"), synced_dog(10, "Rex")]);
    let h = harness_with(tree, true);
    h.session
        .enqueue_deletion(DeletionRecord::new(DeletionTarget::dog(9), at(0)))
        .unwrap();

    run(&h).await;

    assert_eq!(h.remote.calls(), vec![RemoteCall::DeleteDog { dog_id: 9 }]);
    let tree = h.session.tree();
    assert!(tree.dog_by_id(9).is_none());
    let published = h.delegate.trees();
    assert!(published.len() >= 2);
    assert!(published.iter().all(|t| t.dog_by_id(9).is_none()));
}

#[tokio::test]
async fn failed_deletion_is_dequeued() {
    let h = harness();
    h.session
        .enqueue_deletion(DeletionRecord::new(DeletionTarget::reminder(3, 4), at(0)))
        .unwrap();
    h.remote.script(&[Reply::Failure]);

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert_eq!(h.remote.calls(), vec![RemoteCall::DeleteReminder { dog_id: 3, reminder_id: 4 }]);
    assert!(h.session.outbox_records().is_empty());
}

#[tokio::test]
async fn entity_with_server_id_is_updated_not_created() {
    let mut dog = synced_dog(5, "Rex");
    let mut reminder = Reminder::new("feed", 60, at(0));
    reminder.reminder_id = Some(55);
    reminder.offline.mark_needs_sync(at(0));
    dog.reminders.push(reminder);
    let mut log = Log::new("walk", at(0), at(0));
    log.log_id = Some(56);
    log.offline.mark_needs_sync(at(0));
    dog.logs.push(log);
    let h = harness_with(EntityTree::new(vec![dog]), true);

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::UpdateReminders { dog_id: 5, reminder_ids: vec![Some(55)] },
            RemoteCall::UpdateLog { dog_id: 5, log_id: Some(56) },
        ]
    );
}

#[tokio::test]
async fn removing_unborn_entity_never_reaches_server() {
    let h = harness();
    let dog = h.session.add_dog("Rex").unwrap();
    h.session.remove_dog(dog).unwrap();

    assert!(matches!(h.driver.start_monitoring(), StartOutcome::NothingPending));
    assert!(h.remote.calls().is_empty());
}

#[tokio::test]
async fn removal_during_create_deletes_new_server_copy() {
    let h = harness();
    let dog = h.session.add_dog("Rex").unwrap();
    let session = Arc::clone(&h.session);
    h.remote.on_call(move |call| {
        if matches!(call, RemoteCall::CreateDog { .. }) {
            session.remove_dog(dog).unwrap();
        }
    });

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() },
            RemoteCall::DeleteDog { dog_id: 100 },
        ]
    );
    assert!(h.session.tree().dogs.is_empty());
    assert!(!h.session.has_pending_work());
}

#[tokio::test]
async fn edit_during_create_is_pushed_as_update() {
    let h = harness();
    let dog = h.session.add_dog("Rex").unwrap();
    let session = Arc::clone(&h.session);
    h.remote.on_call(move |call| {
        if matches!(call, RemoteCall::CreateDog { .. }) {
            session.update_dog(dog, |d| d.name = "Max".to_string()).unwrap();
        }
    });

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::CreateDog { uuid: dog, name: "Rex".to_string() },
            RemoteCall::UpdateDog { dog_id: 100, name: "Max".to_string() },
        ]
    );
    assert!(!h.session.has_pending_work());
}

#[tokio::test]
async fn child_of_never_created_dog_is_dropped_from_sync() {
    let mut orphan_parent = Dog::new("Rex", at(0));
    let mut reminder = Reminder::new("feed", 60, at(0));
    reminder.offline.mark_needs_sync(at(0));
    orphan_parent.reminders.push(reminder);
    let h = harness_with(EntityTree::new(vec![orphan_parent]), true);

    assert_eq!(run(&h).await, EpisodeEnd::Completed);

    assert!(h.remote.calls().is_empty());
    assert!(!h.session.has_pending_work());
}

#[tokio::test]
async fn pulled_tree_merges_and_publishes() {
    let h = harness();
    h.remote.set_tree(EntityTree::new(vec![synced_dog(50, "Server")]));
    let local = h.session.add_dog("Local").unwrap();
    h.session.mark_needs_resync(ResyncClass::PullEntityTree).unwrap();

    run(&h).await;

    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::GetEntityTree,
            RemoteCall::CreateDog { uuid: local, name: "Local".to_string() },
        ]
    );
    let tree = h.session.tree();
    assert_eq!(tree.dogs.len(), 2);
    assert!(tree.dog_by_id(50).is_some());
    assert_eq!(tree.dog(local).unwrap().dog_id, Some(100));

    let published = h.delegate.trees();
    assert_eq!(published.first().map(|t| t.dogs.len()), Some(2));
    assert_eq!(published.last(), Some(&tree));
}

#[tokio::test]
async fn completion_publishes_final_tree() {
    let h = harness();
    h.session.mark_needs_resync(ResyncClass::PullFamily).unwrap();

    run(&h).await;

    assert_eq!(h.delegate.trees(), vec![h.session.tree()]);
    assert_eq!(h.driver.state(), SyncState::Idle);
}
