// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pawsync::DirtyEntity;

use crate::cli::OutputFormat;
use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session()?;
    println!("{}", render(&session.pending_entities(), output)?);
    Ok(())
}

/// One line per dirty entity, in push order.
pub fn render(entities: &[DirtyEntity], output: OutputFormat) -> Result<String> {
    super::render(entities, output, |entities| {
        if entities.is_empty() {
            return "Nothing pending.".to_string();
        }
        entities
            .iter()
            .map(|e| format!("{:<9} {}", e.tier().to_string(), e))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
