//! Uninstall command CLI wrapper
//!
//! Delegates to operations/uninstall.rs. Packages are removed in the order
//! given and the command stops at the first failure.

use std::path::Path;

use console::Style;

use crate::cli::UninstallArgs;
use crate::error::Result;
use crate::operations::{UninstallOperation, UninstallOptions};

/// Run uninstall command
pub fn run(record_dir: &Path, args: &UninstallArgs) -> Result<()> {
    let options = UninstallOptions::from_args(args, record_dir);
    UninstallOperation::new(options).execute(|removed| {
        println!(
            "Uninstalled {} {}",
            Style::new().bold().yellow().apply_to(&removed.name),
            removed.version
        );
    })?;
    Ok(())
}
