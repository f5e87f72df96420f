//! File installers
//!
//! Each manifest entry type is materialized by an [`Installer`]. The set of
//! supported types is an explicit [`InstallerRegistry`] built by the caller:
//!
//! - **file**: copy `src` to `dest`
//! - **dir**: create `dest`, optionally mirroring the files under `src`
//! - **template**: render `src` and write the output to `dest`
//!
//! Installers must be safe to run again over their own output, since
//! re-running an install is how a partial failure is recovered.

pub mod dir;
pub mod file;
pub mod file_ops;
pub mod template;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, manifest as manifest_error};
use crate::manifest::{File, FileType, Manifest};
use crate::path_utils;
use crate::record::InstallFile;
use crate::values::Values;

pub use dir::DirInstaller;
pub use file::FileInstaller;
pub use template::TemplateInstaller;

/// Everything an installer needs to resolve and render one entry
#[derive(Debug, Clone, Copy)]
pub struct InstallContext<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub src_root: &'a Path,
    pub dest_root: &'a Path,
    /// Manifest defaults merged with caller values
    pub values: &'a Values,
}

impl<'a> InstallContext<'a> {
    pub fn new(manifest: &'a Manifest, dest_root: &'a Path, values: &'a Values) -> Self {
        Self {
            name: manifest.name(),
            version: manifest.version(),
            src_root: manifest.src_root(),
            dest_root,
            values,
        }
    }

    pub fn src_path(&self, file: &File) -> PathBuf {
        path_utils::join_under(self.src_root, &file.src)
    }

    pub fn dest_path(&self, file: &File) -> PathBuf {
        path_utils::join_under(self.dest_root, &file.dest)
    }
}

/// Materializes one kind of manifest entry
pub trait Installer: Send + Sync + fmt::Debug {
    /// Apply `file` under the context's destination root and describe every
    /// artifact written, in the order written.
    fn install(&self, file: &File, context: &InstallContext<'_>) -> Result<Vec<InstallFile>>;
}

/// Installers keyed by the entry type they handle
#[derive(Debug, Clone, Default)]
pub struct InstallerRegistry {
    installers: BTreeMap<FileType, Arc<dyn Installer>>,
}

impl InstallerRegistry {
    /// Create a registry without any installers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `file`, `dir` and `template` installers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(FileType::File, Box::new(FileInstaller));
        registry.register(FileType::Dir, Box::new(DirInstaller));
        registry.register(FileType::Template, Box::new(TemplateInstaller::new()));
        registry
    }

    /// Register `installer` for `file_type`, replacing any previous one
    pub fn register(&mut self, file_type: FileType, installer: Box<dyn Installer>) {
        self.installers.insert(file_type, Arc::from(installer));
    }

    pub fn supports(&self, file_type: &FileType) -> bool {
        self.installers.contains_key(file_type)
    }

    /// Fail on the first entry whose type has no installer
    pub fn ensure_supported(&self, manifest: &Manifest) -> Result<()> {
        match manifest.files.iter().find(|f| !self.supports(&f.file_type)) {
            Some(file) => Err(manifest_error::unsupported_type(&file.file_type, &file.src)),
            None => Ok(()),
        }
    }

    /// Install one entry with the installer registered for its type
    pub fn install(&self, file: &File, context: &InstallContext<'_>) -> Result<Vec<InstallFile>> {
        let installer = self
            .installers
            .get(&file.file_type)
            .ok_or_else(|| manifest_error::unsupported_type(&file.file_type, &file.src))?;

        debug!(file_type = %file.file_type, src = %file.src, dest = %file.dest, "installing entry");
        installer.install(file, context)
    }
}
