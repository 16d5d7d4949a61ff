// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pawsync_core::DeletionRecord;

use crate::cli::OutputFormat;
use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session()?;
    println!("{}", render(&session.outbox_records(), output)?);
    Ok(())
}

/// One line per queued deletion, in replay order.
pub fn render(records: &[DeletionRecord], output: OutputFormat) -> Result<String> {
    super::render(records, output, |records| {
        if records.is_empty() {
            return "No queued deletions.".to_string();
        }
        records
            .iter()
            .map(|r| format!("{}  delete {}", r.deleted_at.to_rfc3339(), r.target))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
