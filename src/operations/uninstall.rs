//! Uninstall operation module
//!
//! Removes installed packages through their records. A failed removal
//! re-saves the record as `DeleteFailed` so the failure stays visible.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::UninstallArgs;
use crate::error::{Result, SupvError};
use crate::record::{RecordPhase, require_install_record};

/// Configuration options for uninstall
#[derive(Debug, Clone)]
pub struct UninstallOptions {
    pub names: Vec<String>,
    pub record_dir: PathBuf,
}

impl UninstallOptions {
    pub fn from_args(args: &UninstallArgs, record_dir: &Path) -> Self {
        Self {
            names: args.names.clone(),
            record_dir: record_dir.to_path_buf(),
        }
    }
}

/// A package that was removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uninstalled {
    pub name: String,
    pub version: String,
}

/// High-level uninstall operation
pub struct UninstallOperation {
    options: UninstallOptions,
}

impl UninstallOperation {
    pub fn new(options: UninstallOptions) -> Self {
        Self { options }
    }

    /// Uninstall every named package in order, stopping at the first failure.
    ///
    /// `on_removed` is called after each package so callers can report
    /// progress that a later failure would otherwise hide.
    pub fn execute(&self, mut on_removed: impl FnMut(&Uninstalled)) -> Result<Vec<Uninstalled>> {
        let mut removed = Vec::with_capacity(self.options.names.len());
        for name in &self.options.names {
            let done = uninstall(&self.options.record_dir, name)?;
            on_removed(&done);
            removed.push(done);
        }
        Ok(removed)
    }
}

/// Uninstall one package by name
pub fn uninstall(record_dir: &Path, name: &str) -> Result<Uninstalled> {
    let mut record = require_install_record(record_dir, name)?;
    info!(package = %name, version = %record.version, "uninstalling");

    if let Err(e) = record.uninstall() {
        // The record file is removed last; once it is gone there is nothing
        // left to mark.
        if !record.path().exists() {
            return Err(e);
        }
        warn!(package = %name, error = %e, "uninstall failed");
        record.finish(Some(&e), RecordPhase::DeleteFailed);
        return match record.save() {
            Ok(()) => Err(e),
            Err(save) => Err(SupvError::combine(Some(e), save)),
        };
    }

    Ok(Uninstalled {
        name: record.name,
        version: record.version,
    })
}
