//! Show command implementation

use std::path::Path;

use crate::cli::ShowArgs;
use crate::error::{Result, record as record_error};
use crate::operations::{ShowOperation, ShowOptions};
use crate::ui;

/// Run show command
///
/// With `--verify`, the report is printed first and the command then fails
/// if any file was modified or removed.
pub fn run(record_dir: &Path, args: &ShowArgs) -> Result<()> {
    let report = ShowOperation::new(record_dir, ShowOptions::from(args)).execute()?;
    if args.json {
        print!("{}", ui::to_json(&ui::report_json(&report)?)?);
    } else {
        print!("{}", ui::render_report(&report));
    }

    match report.problems() {
        0 => Ok(()),
        count => Err(record_error::verify_failed(&report.record.name, count)),
    }
}
