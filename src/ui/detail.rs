//! Package detail for `show`

use std::fmt::Write as _;

use console::Style;
use serde_json::{Value, json};

use crate::error::Result;
use crate::operations::{FileCheck, ShowReport};
use crate::record::Integrity;

use super::table::phase_style;

/// Render a record with its files, hooks, history and verification
pub fn render_report(report: &ShowReport) -> String {
    let record = &report.record;
    let label = Style::new().bold();
    let mut out = String::new();

    let _ = writeln!(out, "{}", Style::new().bold().yellow().apply_to(&record.name));
    let _ = writeln!(out, "  {} {}", label.apply_to("Version:"), record.version);
    let _ = writeln!(
        out,
        "  {} {}",
        label.apply_to("Phase:"),
        phase_style(record).apply_to(record.phase)
    );
    if !record.message.is_empty() {
        let _ = writeln!(out, "  {} {}", label.apply_to("Message:"), record.message);
    }
    if !record.image.is_empty() {
        let _ = writeln!(out, "  {} {}", label.apply_to("Image:"), record.image);
    }
    let _ = writeln!(
        out,
        "  {} {}",
        label.apply_to("Root:"),
        record.install_root.display()
    );

    let _ = writeln!(out, "  {}", label.apply_to("Files:"));
    for file in &record.files {
        let _ = writeln!(
            out,
            "    {} {:<8} {} {}:{} {}",
            file.mode,
            file.file_type,
            Style::new().dim().apply_to(&file.delete_policy),
            file.uid,
            file.gid,
            Style::new().cyan().apply_to(file.dest.display())
        );
    }

    if !record.hooks.is_empty() {
        let _ = writeln!(out, "  {}", label.apply_to("Hooks:"));
        for (hook_type, hook) in &record.hooks {
            let _ = writeln!(out, "    {hook_type}: {}", hook.script);
        }
    }

    if !record.histories.is_empty() {
        let _ = writeln!(out, "  {}", label.apply_to("History:"));
        for history in &record.histories {
            let _ = write!(
                out,
                "    {} {} {}",
                history.time.format("%Y-%m-%d %H:%M:%S"),
                history.version,
                history.phase
            );
            if !history.message.is_empty() {
                let _ = write!(out, " ({})", history.message);
            }
            out.push('\n');
        }
    }

    if let Some(checks) = &report.checks {
        let _ = writeln!(out, "  {}", label.apply_to("Verification:"));
        for check in checks {
            let _ = writeln!(out, "    {} {}", status_styled(check), check.dest.display());
        }
        let summary = if report.is_intact() {
            Style::new().green().apply_to("all files match")
        } else {
            Style::new().red().apply_to("modified or missing files found")
        };
        let _ = writeln!(out, "    {summary}");
    }

    out
}

/// The record as JSON, with a `verification` list when checks ran
pub fn report_json(report: &ShowReport) -> Result<Value> {
    let mut value = serde_json::to_value(&report.record)?;
    if let (Some(checks), Value::Object(map)) = (&report.checks, &mut value) {
        let checks = checks
            .iter()
            .map(|check| {
                let mut entry = json!({
                    "dest": check.dest,
                    "status": status(&check.integrity),
                });
                if let Integrity::Mismatch { actual } = &check.integrity {
                    entry["actual"] = json!(actual);
                }
                entry
            })
            .collect();
        map.insert("verification".to_string(), Value::Array(checks));
    }
    Ok(value)
}

fn status(integrity: &Integrity) -> &'static str {
    match integrity {
        Integrity::Match => "ok",
        Integrity::Mismatch { .. } => "modified",
        Integrity::Missing => "missing",
        Integrity::Unchecked => "unchecked",
    }
}

fn status_styled(check: &FileCheck) -> String {
    let text = format!("{:<8}", status(&check.integrity));
    match check.integrity {
        Integrity::Match => Style::new().green().apply_to(text).to_string(),
        _ => Style::new().red().apply_to(text).to_string(),
    }
}
