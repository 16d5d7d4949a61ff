// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pawsync::SyncSession;
use pawsync_core::ResyncClass;

use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context, class: &str) -> Result<()> {
    let class: ResyncClass = class.parse()?;
    let session = ctx.open_session()?;
    println!("{}", mark(&session, class)?);
    Ok(())
}

/// Sets the flag for `class` and describes what changed.
pub fn mark(session: &SyncSession, class: ResyncClass) -> Result<String> {
    if session.mark_needs_resync(class)? {
        tracing::info!(%class, "marked for resync");
        Ok(format!("Marked {class} for resync."))
    } else {
        Ok(format!("{class} is already pending."))
    }
}

#[cfg(test)]
#[path = "mark_tests.rs"]
mod tests;
