//! Upgrade command CLI wrapper

use std::path::Path;

use crate::cli::InstallArgs;
use crate::error::Result;
use crate::installer::InstallerRegistry;
use crate::operations::{InstallOperation, InstallOptions};

use super::install::describe;

/// Run upgrade command; the package must already be installed
pub fn run(record_dir: &Path, args: &InstallArgs) -> Result<()> {
    let options = InstallOptions::from_args(args, record_dir)?;
    let registry = InstallerRegistry::with_builtins();
    let summary = InstallOperation::new(&registry, options).upgrade()?;
    print!("{}", describe(&summary));
    Ok(())
}
