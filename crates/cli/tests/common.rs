// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn pawsync() -> Command {
    cargo_bin_cmd!("pawsync")
}

/// A command pointed at a fresh state directory, with a config path that
/// does not exist so host configuration never leaks in.
pub fn pawsync_in(temp: &TempDir) -> Command {
    let mut cmd = pawsync();
    cmd.arg("--state-dir")
        .arg(temp.path().join("state"))
        .arg("--config")
        .arg(temp.path().join("pawsync.toml"))
        .env_remove("PAWSYNC_STATE_DIR")
        .env_remove("PAWSYNC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
