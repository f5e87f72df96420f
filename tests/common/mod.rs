//! Common test utilities for kubesupv integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch host: package sources, an install root and a record directory
#[allow(dead_code)]
pub struct TestHost {
    /// Temporary directory
    pub temp: TempDir,
    /// Destination root packages are installed under
    pub root: PathBuf,
    /// Directory holding install records
    pub records: PathBuf,
}

impl TestHost {
    /// Create a new empty host
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("root");
        let records = temp.path().join("records");
        std::fs::create_dir_all(&root).expect("Failed to create install root");
        Self {
            temp,
            root,
            records,
        }
    }

    /// Start a package source under this host
    pub fn package(&self, name: &str, version: &str) -> TestPackage {
        let path = self
            .temp
            .path()
            .join("packages")
            .join(format!("{name}-{version}"));
        std::fs::create_dir_all(&path).expect("Failed to create package directory");
        TestPackage { path }
    }

    /// A command with the record dir and install root pointed at this host
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kubesupv").expect("Failed to find kubesupv binary");
        cmd.env("KUBESUPV_RECORD_DIR", &self.records)
            .env("KUBESUPV_INSTALL_ROOT", &self.root)
            .env_remove("KUBESUPV_LOG");
        cmd
    }

    /// Path of `path` under the install root
    pub fn host_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Check if a file exists under the install root
    #[allow(dead_code)]
    pub fn exists(&self, path: &str) -> bool {
        self.host_path(path).exists()
    }

    /// Read a file from under the install root
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.host_path(path)).expect("Failed to read installed file")
    }

    /// Parsed install record of `name`, if one exists
    #[allow(dead_code)]
    pub fn record(&self, name: &str) -> Option<Value> {
        let path = self.records.join(format!("{name}.json"));
        let data = std::fs::read_to_string(path).ok()?;
        Some(serde_json::from_str(&data).expect("Failed to parse install record"))
    }

    /// Install `package` and require success
    #[allow(dead_code)]
    pub fn install(&self, package: &TestPackage) {
        self.cmd()
            .arg("install")
            .arg(&package.path)
            .assert()
            .success();
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

/// An unpacked package source directory
pub struct TestPackage {
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestPackage {
    /// Write `manifest.yaml`
    pub fn manifest(self, content: &str) -> Self {
        self.file("manifest.yaml", content)
    }

    /// Write a source file, creating parent directories
    pub fn file(self, path: &str, content: &str) -> Self {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        self
    }

    /// Write an executable shell script
    #[cfg(unix)]
    pub fn script(self, path: &str, body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let this = self.file(path, &format!("#!/bin/sh\n{body}\n"));
        let file_path = this.path.join(path);
        std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
        this
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Destinations listed in a parsed record, in record order
#[allow(dead_code)]
pub fn record_dests(record: &Value) -> Vec<String> {
    record["files"]
        .as_array()
        .expect("record has a files list")
        .iter()
        .map(|f| f["dest"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_layout() {
        let host = TestHost::new();
        assert!(host.root.is_dir());
        assert!(!host.records.exists());
        assert_eq!(host.host_path("/etc/a"), host.root.join("etc/a"));
    }

    #[test]
    fn test_package_files() {
        let host = TestHost::new();
        let package = host
            .package("pkg", "v1")
            .manifest("name: pkg\nversion: v1\n")
            .file("conf/a.conf", "a");
        assert!(package.path().join("manifest.yaml").exists());
        assert!(package.path().join("conf/a.conf").exists());
    }
}
