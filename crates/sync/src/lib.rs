// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline synchronization engine.
//!
//! Keeps local edits to the entity tree, the user profile and the family
//! durable while offline, and replays them upstream once the host is
//! reachable again.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  mark dirty   ┌──────────────┐
//! │  UI handlers │──────────────►│  SyncSession │ (ledger + entity tree)
//! └──────────────┘               └──────┬───────┘
//!                                       │ next unit (scanner)
//! ┌──────────────┐  reachable    ┌──────▼───────┐     ┌─────────────┐
//! │ Connectivity │──────────────►│  SyncDriver  │────►│  RemoteApi  │
//! │   Monitor    │               │ (one call at │◄────│   (trait)   │
//! └──────────────┘               │   a time)    │     └─────────────┘
//!                                └──────┬───────┘
//!                                       │ tree updates
//!                                ┌──────▼───────┐
//!                                │ SyncDelegate │ (presentation)
//!                                └──────────────┘
//! ```
//!
//! # Features
//!
//! - Strict priority: push user, pull user, pull family, pull tree,
//!   deletions, then dirty dogs, reminders and logs
//! - Three-valued remote outcomes: success and failure resolve the unit,
//!   no response suspends the episode and retries after a fixed delay
//! - Waits on the connectivity monitor instead of polling while offline
//! - Ledger and entity tree persisted to a state directory

mod backoff;
mod config;
mod connectivity;
mod delegate;
mod driver;
mod error;
mod ledger;
mod outcome;
mod remote;
mod scanner;
mod session;
mod unit;

pub use backoff::RetryPolicy;
pub use config::{SyncConfig, CONFIG_FILE_NAME};
pub use connectivity::{ConnectivityMonitor, ConnectivityObserver};
pub use delegate::{NoopDelegate, SyncDelegate};
pub use driver::{EpisodeEnd, StartOutcome, SyncDriver, SyncState};
pub use error::{Result, SyncError};
pub use ledger::SyncLedger;
pub use outcome::Outcome;
pub use remote::{RemoteApi, RemoteFuture};
pub use scanner::{DirtyEntity, Tier};
pub use session::SyncSession;
pub use unit::{next_unit, SyncUnit};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod driver_tests;
