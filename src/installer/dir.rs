//! Directory installer

use std::fs;
use std::os::unix::fs::PermissionsExt;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, fs as fs_error};
use crate::manifest::{DeletePolicy, File, FileType, Mode};
use crate::record::InstallFile;

use super::{InstallContext, Installer, file_ops};

/// Ensures `dest` is a directory and, when `src` is set, mirrors the files
/// under `src` into it.
///
/// The result lists the directory first, then one entry per copied file.
/// Nested directories are created along the way but get no entry of their
/// own. Copied files keep their source permission bits, take the
/// directory's ownership and are always removed with the package.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirInstaller;

impl Installer for DirInstaller {
    fn install(&self, file: &File, context: &InstallContext<'_>) -> Result<Vec<InstallFile>> {
        let dest = context.dest_path(file);

        match fs::metadata(&dest) {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(fs_error::io_error(format!(
                    "'{}' is not a directory",
                    dest.display()
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                file_ops::create_dir_all(&dest)?;
            }
            Err(e) => return Err(fs_error::read_failed(&dest, e)),
        }

        let (uid, gid) = file_ops::resolve_owner(file);
        file_ops::apply_mode_and_owner(&dest, file.mode, uid, gid)?;
        let mut installed = vec![InstallFile::new(dest.clone(), file, uid, gid, String::new())];

        if file.src.is_empty() {
            return Ok(installed);
        }

        let src = context.src_path(file);
        if !src.is_dir() {
            return Err(fs_error::io_error(format!(
                "source '{}' of dir '{}' is not a directory",
                src.display(),
                file.dest
            )));
        }

        for entry in WalkDir::new(&src).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| fs_error::read_failed(&src, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&src).unwrap_or(entry.path());
            let permissions = entry
                .metadata()
                .map_err(|e| fs_error::read_failed(entry.path(), e))?
                .permissions();

            let child = File {
                file_type: FileType::File,
                src: relative.display().to_string(),
                dest: relative.display().to_string(),
                uid: Some(uid),
                gid: Some(gid),
                mode: Mode(permissions.mode() & 0o7777),
                delete_policy: Some(DeletePolicy::Delete),
            };
            let mut source = file_ops::open_source(entry.path())?;
            installed.push(file_ops::materialize(&child, dest.join(relative), &mut source)?);
        }

        debug!(dest = %dest.display(), files = installed.len() - 1, "installed directory");
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{MANIFEST_FILE, Manifest, load_manifest};
    use crate::values::Values;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup(entry: &str) -> (TempDir, TempDir, Manifest) {
        let src = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let dest = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        std::fs::write(
            src.path().join(MANIFEST_FILE),
            format!("name: pkg\nversion: v1\nfiles:\n{entry}"),
        )
        .unwrap();
        let manifest = load_manifest(src.path()).unwrap();
        (src, dest, manifest)
    }

    fn install(manifest: &Manifest, dest: &Path) -> Result<Vec<InstallFile>> {
        let values = Values::new();
        let context = InstallContext::new(manifest, dest, &values);
        DirInstaller.install(&manifest.files[0], &context)
    }

    #[test]
    fn test_install_empty_dir() {
        let (_src, dest, manifest) = setup("  - type: dir\n    dest: /etc/cni/net.d\n    mode: 448\n");

        let installed = install(&manifest, dest.path()).unwrap();

        let target = dest.path().join("etc/cni/net.d");
        assert!(target.is_dir());
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].dest, target);
        assert!(installed[0].hash.is_empty());
        assert_eq!(installed[0].delete_policy, DeletePolicy::Keep);
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o700);
    }

    #[test]
    fn test_install_existing_dir_is_idempotent() {
        let (_src, dest, manifest) = setup("  - type: dir\n    dest: /opt\n");
        fs::create_dir_all(dest.path().join("opt")).unwrap();

        let first = install(&manifest, dest.path()).unwrap();
        let second = install(&manifest, dest.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_install_over_file_fails() {
        let (_src, dest, manifest) = setup("  - type: dir\n    dest: /opt\n");
        fs::write(dest.path().join("opt"), "not a dir").unwrap();

        let err = install(&manifest, dest.path()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_install_copies_tree_without_subdir_entries() {
        let (src, dest, manifest) = setup("  - type: dir\n    src: plugins\n    dest: /opt/cni/bin\n");
        fs::create_dir_all(src.path().join("plugins/sub")).unwrap();
        fs::write(src.path().join("plugins/bridge"), "bridge").unwrap();
        fs::write(src.path().join("plugins/sub/host-local"), "host-local").unwrap();

        let installed = install(&manifest, dest.path()).unwrap();

        let root = dest.path().join("opt/cni/bin");
        let dests: Vec<_> = installed.iter().map(|f| f.dest.clone()).collect();
        assert_eq!(
            dests,
            [root.clone(), root.join("bridge"), root.join("sub/host-local")]
        );
        assert_eq!(installed[0].file_type, FileType::Dir);
        assert_eq!(installed[2].file_type, FileType::File);
        assert_eq!(installed[2].delete_policy, DeletePolicy::Delete);
        assert_eq!(
            installed[2].hash,
            crate::hash::hash_bytes(b"host-local")
        );
        assert_eq!(
            fs::read_to_string(root.join("sub/host-local")).unwrap(),
            "host-local"
        );
    }
}
