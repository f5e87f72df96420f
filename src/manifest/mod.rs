//! Package manifest (manifest.yaml)
//!
//! The manifest declares a package's identity, the files it materializes in
//! install order, default values for templates, and lifecycle hooks.

pub mod file;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, fs as fs_error, manifest as manifest_error};
use crate::hook::{Hook, HookType, Hooks};
use crate::path_utils;
use crate::values::Values;

pub use file::{DeletePolicy, File, FileType, Mode};

/// Manifest file name at the root of every package source
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// A package's declarative description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    name: String,
    version: String,

    /// Entries in install order
    #[serde(default)]
    pub files: Vec<File>,

    /// Default values, overridable by the caller
    #[serde(default)]
    pub values: Values,

    #[serde(default)]
    pub hooks: Hooks,

    /// Absolute source root backing every `src`
    #[serde(skip)]
    src_root: PathBuf,
}

impl Manifest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Find the first entry whose `src` matches
    pub fn find_file_by_src(&self, src: &str) -> Option<&File> {
        self.files.iter().find(|f| f.src == src)
    }

    /// Resolve the hooks that run after the source tree is gone to the
    /// paths their scripts are installed at under `dest_root`.
    pub fn installed_hooks(&self, dest_root: &Path) -> Hooks {
        HookType::UNINSTALL
            .iter()
            .filter_map(|hook_type| {
                let hook = self.hooks.get(hook_type)?;
                let file = self.find_file_by_src(&hook.script)?;
                let dest = path_utils::join_under(dest_root, &file.dest);
                Some((*hook_type, Hook::new(dest.display().to_string())))
            })
            .collect()
    }

    /// Run the hook for `hook_type` from the source tree, if declared
    pub fn run_hook(&self, hook_type: HookType, dest_root: &Path) -> Result<()> {
        if let Some(hook) = self.hooks.get(&hook_type) {
            debug!(hook = %hook_type, package = %self.name, "running manifest hook");
            hook.run(dest_root, Some(&self.src_root))?;
        }
        Ok(())
    }

    fn validate(&mut self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(manifest_error::invalid(path, "name is empty"));
        }
        if self.version.trim().is_empty() {
            return Err(manifest_error::invalid(path, "version is empty"));
        }

        for (index, file) in self.files.iter_mut().enumerate() {
            if file.dest.is_empty() {
                return Err(manifest_error::invalid(
                    path,
                    format!("dest of file #{} ('{}') is empty", index + 1, file.src),
                ));
            }
            if file.file_type.is_file_like() && file.src.is_empty() {
                return Err(manifest_error::invalid(
                    path,
                    format!("src of {} '{}' is empty", file.file_type, file.dest),
                ));
            }
            if file.delete_policy.is_none() {
                file.delete_policy = Some(DeletePolicy::default_for(&file.file_type));
            }
        }

        for (hook_type, hook) in &self.hooks {
            if hook.script.is_empty() {
                return Err(manifest_error::invalid(
                    path,
                    format!("the '{hook_type}' hook's script is empty"),
                ));
            }
        }

        for hook_type in HookType::UNINSTALL {
            if let Some(hook) = self.hooks.get(&hook_type) {
                if self.find_file_by_src(&hook.script).is_none() {
                    return Err(manifest_error::invalid(
                        path,
                        format!(
                            "the '{hook_type}' hook's script '{}' is not one of the package files",
                            hook.script
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Load and validate the manifest at the root of a package source.
///
/// Only reads the manifest file.
pub fn load_manifest(src_root: &Path) -> Result<Manifest> {
    let src_root = std::path::absolute(src_root).map_err(|e| fs_error::read_failed(src_root, e))?;
    let path = src_root.join(MANIFEST_FILE);

    let content =
        std::fs::read_to_string(&path).map_err(|e| manifest_error::parse_failed(&path, e))?;
    let mut manifest: Manifest =
        serde_yaml::from_str(&content).map_err(|e| manifest_error::parse_failed(&path, e))?;

    manifest.validate(&path)?;
    manifest.src_root = src_root;

    debug!(
        name = %manifest.name,
        version = %manifest.version,
        files = manifest.files.len(),
        "loaded manifest"
    );
    Ok(manifest)
}
