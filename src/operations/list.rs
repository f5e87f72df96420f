//! List operation module

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::{InstallRecord, list_records};

/// High-level list operation
pub struct ListOperation {
    record_dir: PathBuf,
}

impl ListOperation {
    pub fn new(record_dir: &Path) -> Self {
        Self {
            record_dir: record_dir.to_path_buf(),
        }
    }

    /// Every recorded package, sorted by name, whatever its phase
    pub fn execute(&self) -> Result<Vec<InstallRecord>> {
        list_records(&self.record_dir)
    }
}
