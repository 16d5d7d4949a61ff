// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  pawsync status                 Show what is waiting to sync
  pawsync pending                List dirty entities in push order
  pawsync outbox                 List queued deletions in replay order
  pawsync mark pull-entity-tree  Force a full tree pull on next sync";

#[derive(Parser)]
#[command(name = "pawsync")]
#[command(about = "Inspect and repair the offline sync state of a pet-care client")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// State directory (defaults to $XDG_STATE_HOME/pawsync)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/pawsync/pawsync.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show pending flags, queued deletions and dirty entities
    Status {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List queued deletions in replay order
    Outbox {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List dirty entities in the order they would be pushed
    Pending {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Flag a class of state for resynchronization
    #[command(after_help = "Classes:\n  \
        push-user         Push the local user profile\n  \
        pull-user         Pull the user profile\n  \
        pull-family       Pull the family\n  \
        pull-entity-tree  Pull dogs, reminders and logs")]
    Mark {
        /// push-user, pull-user, pull-family or pull-entity-tree
        class: String,
    },

    /// Show the effective configuration
    Config,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
