//! Install records
//!
//! One JSON file per package under the record directory holds everything
//! needed to describe, upgrade or remove an installation:
//!
//! ```text
//! <record-dir>/<name>.json
//! ```
//!
//! The record file is itself the first entry of its `files` list, so it is
//! the last thing removed on uninstall and survives any failure before that.

pub mod file;

use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nix::unistd::{getgid, getuid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SupvError, record as record_error};
use crate::hook::{Hook, HookType, Hooks};
use crate::manifest::{DeletePolicy, FileType, Manifest, Mode};
use crate::path_utils;
use crate::values::Values;

pub use file::{InstallFile, Integrity, find_by_dest};

/// Permissions of a saved record
const RECORD_FILE_MODE: u32 = 0o600;

/// Record file extension
const RECORD_EXTENSION: &str = "json";

/// Outcome of the last operation on a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordPhase {
    Success,
    InstallFailed,
    UpgradeFailed,
    DeleteFailed,
}

impl RecordPhase {
    pub fn is_failure(self) -> bool {
        self != RecordPhase::Success
    }
}

impl fmt::Display for RecordPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordPhase::Success => "Success",
            RecordPhase::InstallFailed => "InstallFailed",
            RecordPhase::UpgradeFailed => "UpgradeFailed",
            RecordPhase::DeleteFailed => "DeleteFailed",
        };
        f.write_str(name)
    }
}

/// One install, upgrade or uninstall attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallHistory {
    pub version: String,
    pub phase: RecordPhase,
    #[serde(default)]
    pub message: String,
    pub time: DateTime<Utc>,
}

/// Persisted state of one installed package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    pub name: String,
    pub version: String,

    /// Where the package came from
    #[serde(default)]
    pub image: String,

    /// Artifacts in the order they were written; the record file first
    pub files: Vec<InstallFile>,

    pub phase: RecordPhase,

    #[serde(default)]
    pub message: String,

    /// Uninstall hooks resolved to their installed scripts
    #[serde(default)]
    pub hooks: Hooks,

    /// Values the templates were rendered with
    #[serde(default)]
    pub values: Values,

    #[serde(default)]
    pub install_root: PathBuf,

    /// Oldest first
    #[serde(default)]
    pub histories: Vec<InstallHistory>,

    #[serde(skip)]
    record_dir: PathBuf,
}

/// Path of the record for package `name`
pub fn record_path(record_dir: &Path, name: &str) -> PathBuf {
    record_dir.join(format!(
        "{}.{RECORD_EXTENSION}",
        path_utils::make_path_safe(name)
    ))
}

/// Whether a record exists for package `name`
pub fn is_installed(record_dir: &Path, name: &str) -> Result<bool> {
    let path = record_path(record_dir, name);
    match std::fs::metadata(&path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(record_error::failed(path.display().to_string(), e)),
    }
}

/// Load the record for package `name`, `None` when there is none
pub fn load_install_record(record_dir: &Path, name: &str) -> Result<Option<InstallRecord>> {
    let path = record_path(record_dir, name);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(record_error::failed(path.display().to_string(), e)),
    };

    let mut record = parse_record(&path, &content)?;
    if record.name != name {
        return Err(record_error::name_mismatch(
            path.display().to_string(),
            record.name,
            name,
        ));
    }
    record.record_dir = record_dir.to_path_buf();
    debug!(path = %path.display(), version = %record.version, "loaded install record");
    Ok(Some(record))
}

/// Load the record for package `name`, failing when there is none
pub fn require_install_record(record_dir: &Path, name: &str) -> Result<InstallRecord> {
    load_install_record(record_dir, name)?.ok_or_else(|| record_error::package_not_found(name))
}

/// Load every record in `record_dir`, sorted by package name.
///
/// A missing directory means nothing is installed. Unreadable records are
/// skipped with a warning so one bad file does not hide the others.
pub fn list_records(record_dir: &Path) -> Result<Vec<InstallRecord>> {
    let entries = match std::fs::read_dir(record_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(record_error::failed(record_dir.display().to_string(), e)),
    };

    let mut records = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| record_error::failed(record_dir.display().to_string(), e))?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| record_error::failed(path.display().to_string(), e))
            .and_then(|content| parse_record(&path, &content));
        match parsed {
            Ok(mut record) => {
                record.record_dir = record_dir.to_path_buf();
                records.push(record);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

fn parse_record(path: &Path, content: &str) -> Result<InstallRecord> {
    serde_json::from_str(content).map_err(|e| record_error::failed(path.display().to_string(), e))
}

impl InstallRecord {
    /// Start a record for installing `manifest` under `install_root`.
    ///
    /// The record file is added as the first entry, before anything the
    /// installers produce.
    pub fn new(manifest: &Manifest, install_root: &Path, record_dir: &Path, image: &str) -> Self {
        let own_file = InstallFile {
            dest: record_path(record_dir, manifest.name()),
            file_type: FileType::File,
            uid: getuid().as_raw(),
            gid: getgid().as_raw(),
            mode: Mode(RECORD_FILE_MODE),
            hash: String::new(),
            delete_policy: DeletePolicy::Delete,
        };

        Self {
            name: manifest.name().to_string(),
            version: manifest.version().to_string(),
            image: image.to_string(),
            files: vec![own_file],
            phase: RecordPhase::Success,
            message: String::new(),
            hooks: Hooks::new(),
            values: Values::new(),
            install_root: install_root.to_path_buf(),
            histories: Vec::new(),
            record_dir: record_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        record_path(&self.record_dir, &self.name)
    }

    /// Append artifacts in install order
    pub fn append(&mut self, files: impl IntoIterator<Item = InstallFile>) {
        self.files.extend(files);
    }

    /// Set the phase from an operation outcome and add a history entry.
    ///
    /// `failure` is the phase used when `error` is set.
    pub fn finish(&mut self, error: Option<&SupvError>, failure: RecordPhase) {
        match error {
            None => {
                self.phase = RecordPhase::Success;
                self.message.clear();
            }
            Some(e) => {
                self.phase = failure;
                self.message = e.to_string();
            }
        }
        self.histories.push(InstallHistory {
            version: self.version.clone(),
            phase: self.phase,
            message: self.message.clone(),
            time: Utc::now(),
        });
    }

    /// Write the record, replacing any previous version in one step
    pub fn save(&self) -> Result<()> {
        let path = self.path();
        let fail = |e: &dyn fmt::Display| record_error::failed(path.display().to_string(), e);

        std::fs::create_dir_all(&self.record_dir).map_err(|e| fail(&e))?;
        let mut data = serde_json::to_vec_pretty(self).map_err(|e| fail(&e))?;
        data.push(b'\n');

        // NamedTempFile is created with 0600
        let mut tmp = tempfile::NamedTempFile::new_in(&self.record_dir).map_err(|e| fail(&e))?;
        tmp.write_all(&data).map_err(|e| fail(&e))?;
        tmp.as_file().sync_all().map_err(|e| fail(&e))?;
        tmp.persist(&path).map_err(|e| fail(&e.error))?;

        debug!(path = %path.display(), phase = %self.phase, "saved install record");
        Ok(())
    }

    /// Remove everything this record installed.
    ///
    /// Runs `beforeUninstall`, removes files newest first honoring their
    /// delete policy, then runs `afterUninstall`. The record file is the
    /// oldest entry and therefore goes last. Stops at the first error,
    /// leaving the remaining files in place.
    pub fn uninstall(&self) -> Result<()> {
        self.run_hook(HookType::BeforeUninstall)?;

        // The script is one of the files about to be removed.
        let after = self.stage_hook(HookType::AfterUninstall)?;

        for file in self.files.iter().rev() {
            file.remove()?;
        }

        if let Some((_dir, hook)) = after {
            hook.run(&self.install_root, None)?;
        }

        info!(package = %self.name, version = %self.version, "uninstalled");
        Ok(())
    }

    fn run_hook(&self, hook_type: HookType) -> Result<()> {
        if let Some(hook) = self.hooks.get(&hook_type) {
            debug!(hook = %hook_type, package = %self.name, "running record hook");
            hook.run(&self.install_root, None)?;
        }
        Ok(())
    }

    /// Copy a hook script to a temporary directory that outlives removal.
    ///
    /// A script already gone from a partial uninstall is skipped.
    fn stage_hook(&self, hook_type: HookType) -> Result<Option<(tempfile::TempDir, Hook)>> {
        let Some(hook) = self.hooks.get(&hook_type) else {
            return Ok(None);
        };
        let script = hook.script_path(None);
        let staged_err = |e: std::io::Error| {
            SupvError::ScriptFailed {
                script: hook.script.clone(),
                reason: format!("stage script: {e}"),
                output: String::new(),
            }
        };

        let dir = tempfile::Builder::new()
            .prefix("kubesupv-hook-")
            .tempdir_in(crate::temp::temp_dir_base())
            .map_err(staged_err)?;
        let file_name = script.file_name().unwrap_or(script.as_os_str());
        let staged = dir.path().join(file_name);
        match std::fs::copy(&script, &staged) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    hook = %hook_type,
                    script = %script.display(),
                    "hook script already removed, skipping"
                );
                return Ok(None);
            }
            Err(e) => return Err(staged_err(e)),
        }

        Ok(Some((dir, Hook::new(staged.display().to_string()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{MANIFEST_FILE, load_manifest};
    use tempfile::TempDir;

    fn manifest(src: &Path, yaml: &str) -> Manifest {
        std::fs::write(src.join(MANIFEST_FILE), yaml).unwrap();
        load_manifest(src).unwrap()
    }

    fn temp() -> TempDir {
        TempDir::new_in(crate::temp::temp_dir_base()).unwrap()
    }

    #[test]
    fn test_record_path_is_name_json() {
        assert_eq!(
            record_path(Path::new("/var/lib/kubesupv"), "kubelet"),
            PathBuf::from("/var/lib/kubesupv/kubelet.json")
        );
        assert_eq!(
            record_path(Path::new("/r"), "a/b"),
            PathBuf::from("/r/a-b.json")
        );
    }

    #[test]
    fn test_new_record_lists_itself_first() {
        let src = temp();
        let records = temp();
        let m = manifest(src.path(), "name: etcd\nversion: v3.5.9\n");

        let record = InstallRecord::new(&m, Path::new("/"), records.path(), "registry/etcd:v3.5.9");

        assert_eq!(record.files.len(), 1);
        assert_eq!(record.files[0].dest, records.path().join("etcd.json"));
        assert_eq!(record.files[0].delete_policy, DeletePolicy::Delete);
        assert_eq!(record.path(), record.files[0].dest);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let src = temp();
        let records = temp();
        let m = manifest(src.path(), "name: etcd\nversion: v3.5.9\n");
        let mut record = InstallRecord::new(&m, Path::new("/host"), &records.path().join("nested"), "img");
        record.values.insert("key".to_string(), serde_json::json!({"a": [1, 2]}));
        record.hooks.insert(HookType::BeforeUninstall, Hook::new("/host/usr/libexec/pre.sh"));
        record.finish(None, RecordPhase::InstallFailed);

        record.save().unwrap();
        let loaded = load_install_record(&records.path().join("nested"), "etcd")
            .unwrap()
            .unwrap();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_is_none() {
        let records = temp();
        assert!(load_install_record(records.path(), "absent").unwrap().is_none());
        assert!(!is_installed(records.path(), "absent").unwrap());
        let err = require_install_record(records.path(), "absent").unwrap_err();
        assert!(matches!(err, SupvError::PackageNotFound { .. }));
    }

    #[test]
    fn test_load_name_mismatch() {
        let src = temp();
        let records = temp();
        let m = manifest(src.path(), "name: etcd\nversion: v1\n");
        InstallRecord::new(&m, Path::new("/"), records.path(), "").save().unwrap();
        std::fs::rename(records.path().join("etcd.json"), records.path().join("other.json")).unwrap();

        let err = load_install_record(records.path(), "other").unwrap_err();
        assert!(matches!(err, SupvError::RecordNameMismatch { .. }));
    }

    #[test]
    fn test_load_corrupt_record() {
        let records = temp();
        std::fs::write(records.path().join("bad.json"), "{ not json").unwrap();
        let err = load_install_record(records.path(), "bad").unwrap_err();
        assert!(matches!(err, SupvError::RecordFailed { .. }));
    }

    #[test]
    fn test_list_records_sorted_and_skips_bad_files() {
        let src = temp();
        let records = temp();
        for name in ["zeta", "alpha"] {
            let m = manifest(src.path(), &format!("name: {name}\nversion: v1\n"));
            InstallRecord::new(&m, Path::new("/"), records.path(), "").save().unwrap();
        }
        std::fs::write(records.path().join("broken.json"), "nope").unwrap();
        std::fs::write(records.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<_> = list_records(records.path())
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_list_records_missing_dir() {
        let records = temp();
        assert!(list_records(&records.path().join("none")).unwrap().is_empty());
    }

    #[test]
    fn test_finish_records_failure_and_history() {
        let src = temp();
        let m = manifest(src.path(), "name: etcd\nversion: v2\n");
        let mut record = InstallRecord::new(&m, Path::new("/"), Path::new("/r"), "");

        let err = crate::error::fs::io_error("disk full");
        record.finish(Some(&err), RecordPhase::UpgradeFailed);

        assert_eq!(record.phase, RecordPhase::UpgradeFailed);
        assert!(record.message.contains("disk full"));
        assert_eq!(record.histories.len(), 1);
        assert_eq!(record.histories[0].version, "v2");
        assert_eq!(record.histories[0].phase, RecordPhase::UpgradeFailed);
    }

    #[test]
    fn test_phase_serialized_names() {
        assert_eq!(
            serde_json::to_string(&RecordPhase::DeleteFailed).unwrap(),
            "\"DeleteFailed\""
        );
        assert_eq!(RecordPhase::InstallFailed.to_string(), "InstallFailed");
    }

    #[test]
    fn test_uninstall_removes_in_reverse_and_keeps() {
        let src = temp();
        let root = temp();
        let records = temp();
        let m = manifest(src.path(), "name: pkg\nversion: v1\n");
        let mut record = InstallRecord::new(&m, root.path(), records.path(), "");

        let dir = root.path().join("d");
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("sub/a.txt"), "a").unwrap();
        let entry = |dest: PathBuf, file_type: FileType, delete_policy| InstallFile {
            dest,
            file_type,
            uid: 0,
            gid: 0,
            mode: Mode::default(),
            hash: String::new(),
            delete_policy,
        };
        record.append([
            entry(dir.clone(), FileType::Dir, DeletePolicy::Keep),
            entry(dir.join("sub/a.txt"), FileType::File, DeletePolicy::Delete),
            entry(root.path().join("gone.txt"), FileType::File, DeletePolicy::Delete),
        ]);
        record.save().unwrap();

        record.uninstall().unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("sub/a.txt").exists());
        assert!(!record.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_uninstall_runs_hooks_around_removal() {
        let src = temp();
        let root = temp();
        let records = temp();
        let m = manifest(src.path(), "name: pkg\nversion: v1\n");
        let mut record = InstallRecord::new(&m, root.path(), records.path(), "");

        let log = root.path().join("hooks.log");
        let script = root.path().join("hook.sh");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nif [ -e \"$INSTALL_ROOT/hook.sh\" ]; then echo present >> {0}; else echo absent >> {0}; fi\n",
                log.display()
            ),
        )
        .unwrap();
        record.append([InstallFile {
            dest: script.clone(),
            file_type: FileType::File,
            uid: 0,
            gid: 0,
            mode: Mode(0o755),
            hash: String::new(),
            delete_policy: DeletePolicy::Delete,
        }]);
        let hook = Hook::new(script.display().to_string());
        record.hooks.insert(HookType::BeforeUninstall, hook.clone());
        record.hooks.insert(HookType::AfterUninstall, hook);
        record.save().unwrap();

        record.uninstall().unwrap();

        assert!(!script.exists());
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "present\nabsent\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_uninstall_stops_on_failed_hook() {
        let src = temp();
        let root = temp();
        let records = temp();
        let m = manifest(src.path(), "name: pkg\nversion: v1\n");
        let mut record = InstallRecord::new(&m, root.path(), records.path(), "");
        let script = root.path().join("fail.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 1\n").unwrap();
        record
            .hooks
            .insert(HookType::BeforeUninstall, Hook::new(script.display().to_string()));
        record.save().unwrap();

        assert!(record.uninstall().is_err());
        assert!(record.path().exists());
    }

    #[test]
    fn test_uninstall_retry_skips_removed_after_hook() {
        let src = temp();
        let root = temp();
        let records = temp();
        let m = manifest(src.path(), "name: pkg\nversion: v1\n");
        let mut record = InstallRecord::new(&m, root.path(), records.path(), "");

        // Left over from an earlier uninstall that removed the script and then failed.
        let script = root.path().join("after.sh");
        record.append([InstallFile {
            dest: script.clone(),
            file_type: FileType::File,
            uid: 0,
            gid: 0,
            mode: Mode(0o755),
            hash: String::new(),
            delete_policy: DeletePolicy::Delete,
        }]);
        record
            .hooks
            .insert(HookType::AfterUninstall, Hook::new(script.display().to_string()));
        record.phase = RecordPhase::DeleteFailed;
        record.save().unwrap();

        record.uninstall().unwrap();

        assert!(!record.path().exists());
    }
}
