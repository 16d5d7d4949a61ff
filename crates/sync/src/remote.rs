// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote collaborator abstraction.
//!
//! The engine never talks HTTP itself; the host supplies an implementation
//! that maps its transport's responses onto [`Outcome`]. Tests use a scripted
//! mock.

use std::future::Future;
use std::pin::Pin;

use pawsync_core::{Dog, EntityTree, Family, Log, Reminder, UserProfile};

use crate::outcome::Outcome;

/// Boxed future returned by every remote call.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Outcome<T>> + Send + 'a>>;

/// Server operations the engine replays local state through.
///
/// Implementations must distinguish a definitive rejection
/// ([`Outcome::Failure`]) from an unanswered request
/// ([`Outcome::NoResponse`]); the engine retries only the latter.
pub trait RemoteApi: Send + Sync {
    /// Push the local user profile.
    fn update_user(&self, profile: UserProfile) -> RemoteFuture<'_, ()>;

    /// Fetch the server's user profile.
    fn get_user(&self) -> RemoteFuture<'_, UserProfile>;

    /// Fetch the family the user belongs to.
    fn get_family(&self) -> RemoteFuture<'_, Family>;

    /// Fetch the server's entity tree given what is known locally.
    fn get_entity_tree(&self, known: EntityTree) -> RemoteFuture<'_, EntityTree>;

    /// Create a dog; resolves to its server id.
    fn create_dog(&self, dog: Dog) -> RemoteFuture<'_, i64>;

    fn update_dog(&self, dog: Dog) -> RemoteFuture<'_, ()>;

    fn delete_dog(&self, dog_id: i64) -> RemoteFuture<'_, ()>;

    /// Create reminders under a dog; resolves to their server ids, in order.
    fn create_reminders(&self, dog_id: i64, reminders: Vec<Reminder>) -> RemoteFuture<'_, Vec<i64>>;

    fn update_reminders(&self, dog_id: i64, reminders: Vec<Reminder>) -> RemoteFuture<'_, ()>;

    fn delete_reminder(&self, dog_id: i64, reminder_id: i64) -> RemoteFuture<'_, ()>;

    /// Create a log under a dog; resolves to its server id.
    fn create_log(&self, dog_id: i64, log: Log) -> RemoteFuture<'_, i64>;

    fn update_log(&self, dog_id: i64, log: Log) -> RemoteFuture<'_, ()>;

    fn delete_log(&self, dog_id: i64, log_id: i64) -> RemoteFuture<'_, ()>;
}
