// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pawsync::SyncConfig;

use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    println!("{}", render(ctx)?);
    Ok(())
}

/// Effective configuration as TOML, with the resolved state directory
/// filled in and the source file noted in a leading comment.
pub fn render(ctx: &Context) -> Result<String> {
    let effective = SyncConfig { state_dir: Some(ctx.state_dir.clone()), ..ctx.config.clone() };
    let source = if ctx.config_path.exists() { "" } else { " (not found, using defaults)" };
    Ok(format!("# {}{}\n{}", ctx.config_path.display(), source, effective.to_toml()?.trim_end()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
