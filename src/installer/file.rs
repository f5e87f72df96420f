//! Plain file installer

use crate::error::Result;
use crate::manifest::File;
use crate::record::InstallFile;

use super::{InstallContext, Installer, file_ops};

/// Copies `src` byte for byte to `dest`
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInstaller;

impl Installer for FileInstaller {
    fn install(&self, file: &File, context: &InstallContext<'_>) -> Result<Vec<InstallFile>> {
        let mut source = file_ops::open_source(&context.src_path(file))?;
        let installed = file_ops::materialize(file, context.dest_path(file), &mut source)?;
        Ok(vec![installed])
    }
}
