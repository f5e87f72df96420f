//! Lifecycle hook scripts
//!
//! Hooks are executables shipped inside the package. Install and upgrade hooks
//! run from the package source tree; uninstall hooks run from the path the
//! script was installed to, recorded in the install record.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, hook as hook_error};
use crate::path_utils;

/// Environment variable holding the destination root
pub const ENV_INSTALL_ROOT: &str = "INSTALL_ROOT";
/// Environment variable holding the package source root
pub const ENV_SOURCE_ROOT: &str = "SOURCE_ROOT";

/// Points in the package lifecycle where a hook may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookType {
    BeforeInstall,
    AfterInstall,
    BeforeUpgrade,
    AfterUpgrade,
    BeforeUninstall,
    AfterUninstall,
}

impl HookType {
    /// Hooks that run after the package source is gone and therefore must be
    /// installed as files of the package
    pub const UNINSTALL: [HookType; 2] = [HookType::BeforeUninstall, HookType::AfterUninstall];

    pub fn as_str(self) -> &'static str {
        match self {
            HookType::BeforeInstall => "beforeInstall",
            HookType::AfterInstall => "afterInstall",
            HookType::BeforeUpgrade => "beforeUpgrade",
            HookType::AfterUpgrade => "afterUpgrade",
            HookType::BeforeUninstall => "beforeUninstall",
            HookType::AfterUninstall => "afterUninstall",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks keyed by lifecycle point
pub type Hooks = BTreeMap<HookType, Hook>;

/// A lifecycle script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Script path, relative to the source root for manifest hooks and
    /// absolute for hooks carried in an install record
    pub script: String,
}

/// Result of a finished hook process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Interleaved stdout and stderr
    pub output: String,
}

impl HookOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl Hook {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Resolve the script location.
    ///
    /// With a source root the script is taken relative to it, otherwise the
    /// script path is used as recorded.
    pub fn script_path(&self, source_root: Option<&Path>) -> PathBuf {
        match source_root {
            Some(root) => path_utils::join_under(root, &self.script),
            None => PathBuf::from(&self.script),
        }
    }

    /// Run the hook to completion.
    ///
    /// Fails when the script is missing, is a directory, cannot be started,
    /// or exits non-zero. The captured output is part of the error.
    pub fn run(&self, install_root: &Path, source_root: Option<&Path>) -> Result<HookOutput> {
        let script = self.script_path(source_root);
        let script_name = script.display().to_string();

        let metadata = fs::metadata(&script)
            .map_err(|e| hook_error::script_failed(&script_name, e.to_string(), ""))?;
        if metadata.is_dir() {
            return Err(hook_error::script_failed(&script_name, "is a directory", ""));
        }
        ensure_executable(&script, &metadata)?;

        let log = tempfile::tempfile()
            .map_err(|e| hook_error::script_failed(&script_name, e.to_string(), ""))?;
        let mut command = Command::new(&script);
        command
            .env(ENV_INSTALL_ROOT, install_root)
            .env(ENV_SOURCE_ROOT, source_root.unwrap_or(Path::new("")))
            .stdin(Stdio::null())
            .stdout(clone_handle(&log, &script_name)?)
            .stderr(clone_handle(&log, &script_name)?);
        if let Some(root) = source_root {
            command.current_dir(root);
        }

        debug!(script = %script_name, "running hook");
        let status = command
            .status()
            .map_err(|e| hook_error::script_failed(&script_name, e.to_string(), ""))?;

        let result = HookOutput {
            exit_code: status.code(),
            output: read_log(log, &script_name)?,
        };
        info!(script = %script_name, exit_code = ?result.exit_code, "hook finished");

        if result.success() {
            Ok(result)
        } else {
            Err(hook_error::script_failed(
                &script_name,
                status.to_string(),
                result.output,
            ))
        }
    }
}

/// Add the owner execute bit when it is missing
fn ensure_executable(script: &Path, metadata: &fs::Metadata) -> Result<()> {
    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & 0o100 == 0 {
        permissions.set_mode(mode | 0o100);
        fs::set_permissions(script, permissions).map_err(|e| {
            hook_error::script_failed(
                script.display().to_string(),
                format!("chmod: {e}"),
                "",
            )
        })?;
    }
    Ok(())
}

fn clone_handle(log: &File, script: &str) -> Result<Stdio> {
    log.try_clone()
        .map(Stdio::from)
        .map_err(|e| hook_error::script_failed(script, e.to_string(), ""))
}

fn read_log(mut log: File, script: &str) -> Result<String> {
    let mut buffer = Vec::new();
    log.seek(SeekFrom::Start(0))
        .and_then(|_| log.read_to_end(&mut buffer))
        .map_err(|e| hook_error::script_failed(script, e.to_string(), ""))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SupvError;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        path
    }

    #[test]
    fn test_hook_type_serde_names() {
        let yaml = serde_yaml::to_string(&HookType::BeforeUninstall).unwrap();
        assert_eq!(yaml.trim(), "beforeUninstall");
        let parsed: HookType = serde_yaml::from_str("afterUpgrade").unwrap();
        assert_eq!(parsed, HookType::AfterUpgrade);
    }

    #[test]
    fn test_run_exposes_roots_and_adds_exec_bit() {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let root = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let script = write_script(
            src.path(),
            "hook.sh",
            "echo \"install=$INSTALL_ROOT\"\necho \"source=$SOURCE_ROOT\"\necho err >&2",
        );
        fs::set_permissions(&script, fs::Permissions::from_mode(0o600)).unwrap();

        let output = Hook::new("hook.sh")
            .run(root.path(), Some(src.path()))
            .unwrap();

        assert!(output.success());
        assert!(
            output
                .output
                .contains(&format!("install={}", root.path().display()))
        );
        assert!(
            output
                .output
                .contains(&format!("source={}", src.path().display()))
        );
        assert!(output.output.contains("err"));
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);
    }

    #[test]
    fn test_run_runs_in_source_root() {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write_script(src.path(), "pwd.sh", "pwd");

        let output = Hook::new("pwd.sh").run(Path::new("/"), Some(src.path())).unwrap();
        let canonical = src.path().canonicalize().unwrap();
        assert_eq!(output.output.trim(), canonical.display().to_string());
    }

    #[test]
    fn test_run_absolute_script_without_source_root() {
        let dir = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let script = write_script(dir.path(), "uninstall.sh", "echo removed");

        let output = Hook::new(script.display().to_string())
            .run(Path::new("/"), None)
            .unwrap();
        assert_eq!(output.output.trim(), "removed");
    }

    #[test]
    fn test_run_non_zero_exit_carries_output() {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write_script(src.path(), "fail.sh", "echo something broke\nexit 3");

        let err = Hook::new("fail.sh")
            .run(Path::new("/"), Some(src.path()))
            .unwrap_err();
        match err {
            SupvError::ScriptFailed { output, reason, .. } => {
                assert!(output.contains("something broke"));
                assert!(reason.contains('3'));
            }
            other => panic!("expected ScriptFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_run_directory_fails() {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        fs::create_dir(src.path().join("hooks")).unwrap();

        let err = Hook::new("hooks")
            .run(Path::new("/"), Some(src.path()))
            .unwrap_err();
        assert!(matches!(err, SupvError::ScriptFailed { .. }));
        assert!(err.to_string().contains("is a directory"));
    }

    #[test]
    fn test_run_missing_script_fails() {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let err = Hook::new("missing.sh")
            .run(Path::new("/"), Some(src.path()))
            .unwrap_err();
        assert!(matches!(err, SupvError::ScriptFailed { .. }));
    }
}
