//! Package table for `list`

use console::Style;

use crate::record::InstallRecord;

const HEADERS: [&str; 4] = ["NAME", "VERSION", "PHASE", "UPDATED"];

/// Render records as an aligned table, or a short notice when empty
pub fn render_records(records: &[InstallRecord]) -> String {
    if records.is_empty() {
        return "No packages installed.\n".to_string();
    }

    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|record| {
            [
                record.name.clone(),
                record.version.clone(),
                record.phase.to_string(),
                record
                    .histories
                    .last()
                    .map(|h| h.time.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header = Style::new().bold();
    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths, |_, cell| {
        header.apply_to(cell).to_string()
    });
    for (row, record) in rows.iter().zip(records) {
        push_row(&mut out, row, &widths, |column, cell| match column {
            0 => Style::new().yellow().apply_to(cell).to_string(),
            2 => phase_style(record).apply_to(cell).to_string(),
            _ => cell.to_string(),
        });
    }
    out
}

/// Pad before styling so escape codes do not skew the alignment
fn push_row(
    out: &mut String,
    row: &[String; 4],
    widths: &[usize; 4],
    style: impl Fn(usize, &str) -> String,
) {
    let last = row.len() - 1;
    for (column, (cell, width)) in row.iter().zip(widths).enumerate() {
        let padded = if column == last {
            cell.clone()
        } else {
            format!("{cell:<width$}  ")
        };
        out.push_str(&style(column, &padded));
    }
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

pub(crate) fn phase_style(record: &InstallRecord) -> Style {
    if record.phase.is_failure() {
        Style::new().red()
    } else {
        Style::new().green()
    }
}
