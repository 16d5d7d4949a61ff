// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod mark;
pub mod outbox;
pub mod pending;
pub mod status;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Renders `value` as pretty JSON, or as text with `text`.
fn render<T, F>(value: &T, format: OutputFormat, text: F) -> Result<String>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}
