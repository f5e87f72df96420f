//! Show operation module
//!
//! Loads one package record and optionally checks every recorded content
//! hash against the file on disk.

use std::path::{Path, PathBuf};

use crate::cli::ShowArgs;
use crate::error::Result;
use crate::record::{InstallRecord, Integrity, require_install_record};

/// Configuration options for show
#[derive(Debug, Clone)]
pub struct ShowOptions {
    pub name: String,
    pub verify: bool,
}

impl From<&ShowArgs> for ShowOptions {
    fn from(args: &ShowArgs) -> Self {
        Self {
            name: args.name.clone(),
            verify: args.verify,
        }
    }
}

/// Hash check of one recorded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub dest: PathBuf,
    pub integrity: Integrity,
}

/// A record with its optional verification
#[derive(Debug, Clone)]
pub struct ShowReport {
    pub record: InstallRecord,
    /// Set when verification was requested; unchecked entries are left out
    pub checks: Option<Vec<FileCheck>>,
}

impl ShowReport {
    /// Whether verification ran and found no problem
    pub fn is_intact(&self) -> bool {
        self.checks
            .as_ref()
            .is_none_or(|checks| checks.iter().all(|c| c.integrity == Integrity::Match))
    }

    /// Number of checked files that are modified or missing
    pub fn problems(&self) -> usize {
        self.checks.as_ref().map_or(0, |checks| {
            checks
                .iter()
                .filter(|c| c.integrity != Integrity::Match)
                .count()
        })
    }
}

/// High-level show operation
pub struct ShowOperation {
    record_dir: PathBuf,
    options: ShowOptions,
}

impl ShowOperation {
    pub fn new(record_dir: &Path, options: ShowOptions) -> Self {
        Self {
            record_dir: record_dir.to_path_buf(),
            options,
        }
    }

    pub fn execute(&self) -> Result<ShowReport> {
        let record = require_install_record(&self.record_dir, &self.options.name)?;
        let checks = if self.options.verify {
            Some(verify(&record)?)
        } else {
            None
        };
        Ok(ShowReport { record, checks })
    }
}

fn verify(record: &InstallRecord) -> Result<Vec<FileCheck>> {
    let mut checks = Vec::new();
    for file in &record.files {
        let integrity = file.verify()?;
        if integrity != Integrity::Unchecked {
            checks.push(FileCheck {
                dest: file.dest.clone(),
                integrity,
            });
        }
    }
    Ok(checks)
}
