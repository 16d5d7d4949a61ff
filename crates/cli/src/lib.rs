// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pawsync - inspect and repair the offline sync state of a pet-care client.
//!
//! The `pawsync` binary opens the persisted [`SyncSession`](pawsync::SyncSession)
//! in a state directory and reports on it without contacting the server:
//!
//! - `status` summarizes pending flags, queued deletions and dirty entities
//! - `outbox` and `pending` list deletions and dirty entities in replay order
//! - `mark` flags a class of state for resynchronization
//! - `config` prints the effective configuration

mod cli;
mod commands;
mod context;
pub mod env;
pub mod error;
mod logging;

pub use cli::{Cli, Command, OutputFormat};
pub use context::Context;
pub use error::{Error, Result};

/// Runs a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::resolve(cli.state_dir, cli.config)?;
    match cli.command {
        Command::Status { output } => commands::status::run(&ctx, output),
        Command::Outbox { output } => commands::outbox::run(&ctx, output),
        Command::Pending { output } => commands::pending::run(&ctx, output),
        Command::Mark { class } => commands::mark::run(&ctx, &class),
        Command::Config => commands::config::run(&ctx),
    }
}
