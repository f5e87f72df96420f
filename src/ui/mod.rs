//! Presentation layer
//!
//! Renders install records for the terminal:
//! - a NAME/VERSION/PHASE table for `list`
//! - a detailed view for `show`
//! - pretty JSON for `--json`
//!
//! Renderers return strings so commands decide where output goes.

pub mod detail;
pub mod table;

use serde::Serialize;

use crate::error::Result;

pub use detail::{render_report, report_json};
pub use table::render_records;

/// Pretty JSON with a trailing newline
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
