//! Install operation module
//!
//! Applies a package source to a destination root and records the outcome.
//! A package with no record is installed; one recorded at another version
//! is upgraded, which also removes files the new version no longer ships.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::InstallArgs;
use crate::error::{Result, SupvError, record as record_error};
use crate::hook::HookType;
use crate::installer::{InstallContext, InstallerRegistry};
use crate::manifest::{FileType, Manifest, load_manifest};
use crate::record::{
    InstallRecord, RecordPhase, find_by_dest, is_installed, load_install_record,
};
use crate::values::{self, Values};

/// Configuration options for installation
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Unpacked package directory holding the manifest
    pub source: PathBuf,
    pub install_root: PathBuf,
    pub record_dir: PathBuf,
    /// Provenance recorded with the package
    pub image: String,
    /// Caller values, merged over the manifest defaults
    pub values: Values,
}

impl InstallOptions {
    /// Build options from parsed arguments, reading any values files
    pub fn from_args(args: &InstallArgs, record_dir: &Path) -> Result<Self> {
        Ok(Self {
            source: args.source.clone(),
            install_root: args.root.clone(),
            record_dir: record_dir.to_path_buf(),
            image: args.image.clone().unwrap_or_default(),
            values: values::collect(&args.values_files, &args.set)?,
        })
    }
}

/// What an install did to a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    Installed,
    Reinstalled,
    Upgraded { from: String },
}

/// Result of a successful install or upgrade
#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub name: String,
    pub version: String,
    pub action: InstallAction,
    /// Artifacts written, not counting the record file
    pub installed: usize,
    /// Artifacts of the previous version removed
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Install,
    Upgrade,
}

impl Mode {
    fn hooks(self) -> (HookType, HookType) {
        match self {
            Mode::Install => (HookType::BeforeInstall, HookType::AfterInstall),
            Mode::Upgrade => (HookType::BeforeUpgrade, HookType::AfterUpgrade),
        }
    }

    fn failure_phase(self) -> RecordPhase {
        match self {
            Mode::Install => RecordPhase::InstallFailed,
            Mode::Upgrade => RecordPhase::UpgradeFailed,
        }
    }
}

/// High-level install operation
pub struct InstallOperation<'a> {
    registry: &'a InstallerRegistry,
    options: InstallOptions,
}

impl<'a> InstallOperation<'a> {
    pub fn new(registry: &'a InstallerRegistry, options: InstallOptions) -> Self {
        Self { registry, options }
    }

    /// Install the source, or upgrade when a record exists at another version.
    ///
    /// A record left by a failed upgrade is upgraded again so the files the
    /// previous version owned are still cleaned up.
    pub fn install_or_upgrade(&self) -> Result<InstallSummary> {
        let manifest = load_manifest(&self.options.source)?;
        let old = if is_installed(&self.options.record_dir, manifest.name())? {
            load_install_record(&self.options.record_dir, manifest.name())?
        } else {
            debug!(package = %manifest.name(), "no install record");
            None
        };

        match old {
            Some(old)
                if old.version != manifest.version() || old.phase == RecordPhase::UpgradeFailed =>
            {
                self.upgrade_manifest(&manifest, old)
            }
            old => self.install_manifest(&manifest, old),
        }
    }

    /// Upgrade the source over its existing installation
    pub fn upgrade(&self) -> Result<InstallSummary> {
        let manifest = load_manifest(&self.options.source)?;
        let old = load_install_record(&self.options.record_dir, manifest.name())?
            .ok_or_else(|| record_error::need_install_record(manifest.name()))?;
        self.upgrade_manifest(&manifest, old)
    }

    /// Install `manifest`, carrying the history of `old` when re-installing
    pub fn install_manifest(
        &self,
        manifest: &Manifest,
        old: Option<InstallRecord>,
    ) -> Result<InstallSummary> {
        let action = if old.is_some() {
            InstallAction::Reinstalled
        } else {
            InstallAction::Installed
        };
        self.apply(manifest, old, Mode::Install, action)
    }

    /// Upgrade from `old` to `manifest`
    pub fn upgrade_manifest(
        &self,
        manifest: &Manifest,
        old: InstallRecord,
    ) -> Result<InstallSummary> {
        let action = InstallAction::Upgraded {
            from: old.version.clone(),
        };
        self.apply(manifest, Some(old), Mode::Upgrade, action)
    }

    fn apply(
        &self,
        manifest: &Manifest,
        old: Option<InstallRecord>,
        mode: Mode,
        action: InstallAction,
    ) -> Result<InstallSummary> {
        self.registry.ensure_supported(manifest)?;

        let root = self.options.install_root.as_path();
        let (before, after) = mode.hooks();
        info!(
            package = %manifest.name(),
            version = %manifest.version(),
            root = %root.display(),
            ?mode,
            "applying package"
        );

        let mut record =
            InstallRecord::new(manifest, root, &self.options.record_dir, &self.options.image);
        record.values = values::merge(&manifest.values, &self.options.values);
        record.hooks = manifest.installed_hooks(root);

        let mut removed = 0;
        let mut result = manifest
            .run_hook(before, root)
            .and_then(|()| self.install_files(manifest, &mut record));
        if result.is_ok() && mode == Mode::Upgrade {
            if let Some(old) = &old {
                result = remove_obsolete(old, &record).map(|count| removed = count);
            }
        }
        if result.is_ok() {
            result = manifest.run_hook(after, root);
        }

        let installed = record.files.len() - 1;
        if let Some(old) = old {
            if result.is_err() {
                keep_tracking(&old, &mut record);
            }
            record.histories = old.histories;
        }
        record.finish(result.as_ref().err(), mode.failure_phase());

        let saved = record.save();
        match (result, saved) {
            (Ok(()), Ok(())) => {
                info!(package = %record.name, version = %record.version, "package applied");
                Ok(InstallSummary {
                    name: record.name,
                    version: record.version,
                    action,
                    installed,
                    removed,
                })
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(save)) => Err(save),
            (Err(e), Err(save)) => Err(SupvError::combine(Some(e), save)),
        }
    }

    /// Apply every entry in manifest order, recording as it goes so a
    /// failure leaves everything written so far in the record
    fn install_files(&self, manifest: &Manifest, record: &mut InstallRecord) -> Result<()> {
        let context = InstallContext::new(manifest, &self.options.install_root, &record.values);
        let mut files = Vec::new();
        let mut result = Ok(());
        for file in &manifest.files {
            match self.registry.install(file, &context) {
                Ok(installed) => files.extend(installed),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        record.append(files);
        result
    }
}

/// Remove what `old` installed that `new` no longer has, newest first.
///
/// An obsolete directory that still holds entries of `new` is kept.
fn remove_obsolete(old: &InstallRecord, new: &InstallRecord) -> Result<usize> {
    let mut removed = 0;
    for file in old.files.iter().rev() {
        if find_by_dest(&new.files, &file.dest).is_some() {
            continue;
        }
        if file.file_type == FileType::Dir
            && new.files.iter().any(|f| f.dest.starts_with(&file.dest))
        {
            debug!(path = %file.dest.display(), "keeping obsolete directory still in use");
            continue;
        }
        if file.remove()? {
            debug!(path = %file.dest.display(), "removed obsolete file");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Keep every artifact of `old` that `record` does not cover, so a failed
/// attempt never loses track of what is on disk
fn keep_tracking(old: &InstallRecord, record: &mut InstallRecord) {
    let missing: Vec<_> = old
        .files
        .iter()
        .filter(|f| find_by_dest(&record.files, &f.dest).is_none())
        .cloned()
        .collect();
    record.append(missing);
}
