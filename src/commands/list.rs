//! List command implementation

use std::path::Path;

use crate::cli::ListArgs;
use crate::error::Result;
use crate::operations::ListOperation;
use crate::ui;

/// Run list command
pub fn run(record_dir: &Path, args: &ListArgs) -> Result<()> {
    let records = ListOperation::new(record_dir).execute()?;
    if args.json {
        print!("{}", ui::to_json(&records)?);
    } else {
        print!("{}", ui::render_records(&records));
    }
    Ok(())
}
