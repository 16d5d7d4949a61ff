// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use pawsync::SyncSession;
use pawsync_core::{DirtyCounts, ResyncClass};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::context::Context;
use crate::error::Result;

/// Snapshot of everything waiting to sync.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state_dir: PathBuf,
    pub pending_work: bool,
    pub flags: Vec<ResyncClass>,
    pub queued_deletions: usize,
    pub dirty: DirtyCounts,
}

impl StatusReport {
    pub fn collect(session: &SyncSession, state_dir: PathBuf) -> Self {
        let flags = session.flags();
        StatusReport {
            state_dir,
            pending_work: session.has_pending_work(),
            flags: ResyncClass::ALL.into_iter().filter(|c| flags.is_set(*c)).collect(),
            queued_deletions: session.outbox_records().len(),
            dirty: session.dirty_counts(),
        }
    }
}

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session()?;
    let report = StatusReport::collect(&session, ctx.state_dir.clone());
    println!("{}", render(&report, output)?);
    Ok(())
}

pub fn render(report: &StatusReport, output: OutputFormat) -> Result<String> {
    super::render(report, output, render_text)
}

fn render_text(report: &StatusReport) -> String {
    let flags = if report.flags.is_empty() {
        "none".to_string()
    } else {
        report.flags.iter().map(ResyncClass::as_str).collect::<Vec<_>>().join(", ")
    };
    let dirty = [
        plural(report.dirty.dogs, "dog"),
        plural(report.dirty.reminders, "reminder"),
        plural(report.dirty.logs, "log"),
    ];
    [
        format!("state dir: {}", report.state_dir.display()),
        format!("pending:   {}", if report.pending_work { "yes" } else { "no" }),
        format!("flags:     {flags}"),
        format!("outbox:    {}", plural(report.queued_deletions, "deletion")),
        format!("dirty:     {}", dirty.join(", ")),
    ]
    .join("\n")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
