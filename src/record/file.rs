//! Materialized artifacts

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, fs as fs_error};
use crate::hash;
use crate::manifest::{DeletePolicy, File, FileType, Mode};

/// One artifact written to disk, with the ownership and content it was
/// given at install time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallFile {
    /// Absolute path on the host
    pub dest: PathBuf,

    #[serde(rename = "type")]
    pub file_type: FileType,

    pub uid: u32,
    pub gid: u32,

    #[serde(default)]
    pub mode: Mode,

    /// Content hash, empty for directories and the record file
    #[serde(default)]
    pub hash: String,

    pub delete_policy: DeletePolicy,
}

/// Outcome of a hash check against the file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    Match,
    Mismatch { actual: String },
    Missing,
    /// No recorded hash to compare against
    Unchecked,
}

impl InstallFile {
    /// Build the entry for an artifact materialized from `file`
    pub fn new(dest: PathBuf, file: &File, uid: u32, gid: u32, hash: String) -> Self {
        Self {
            dest,
            file_type: file.file_type.clone(),
            uid,
            gid,
            mode: file.mode,
            hash,
            delete_policy: file.delete_policy(),
        }
    }

    /// Remove the artifact unless its policy is `keep`.
    ///
    /// Returns whether anything was removed. A path that is already gone
    /// counts as removed.
    pub fn remove(&self) -> Result<bool> {
        if self.delete_policy == DeletePolicy::Keep {
            debug!(path = %self.dest.display(), "keeping file");
            return Ok(false);
        }

        let result = match self.file_type {
            FileType::Dir => std::fs::remove_dir_all(&self.dest),
            _ => std::fs::remove_file(&self.dest),
        };
        match result {
            Ok(()) => debug!(path = %self.dest.display(), "removed file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.dest.display(), "already removed");
            }
            Err(e) => {
                return Err(fs_error::io_error(format!(
                    "remove '{}': {e}",
                    self.dest.display()
                )));
            }
        }
        Ok(true)
    }

    /// Re-hash the artifact and compare with the recorded hash
    pub fn verify(&self) -> Result<Integrity> {
        if self.hash.is_empty() {
            return Ok(Integrity::Unchecked);
        }
        if !self.dest.exists() {
            return Ok(Integrity::Missing);
        }
        let actual = hash::hash_file(&self.dest)?;
        if hash::verify_hash(&self.hash, &actual) {
            Ok(Integrity::Match)
        } else {
            Ok(Integrity::Mismatch { actual })
        }
    }
}

/// Find the entry installed at `dest`
pub fn find_by_dest<'a>(files: &'a [InstallFile], dest: &Path) -> Option<&'a InstallFile> {
    files.iter().find(|f| f.dest == dest)
}
