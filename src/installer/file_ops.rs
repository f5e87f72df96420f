//! Shared write path for installers
//!
//! Every regular file an installer produces goes through [`materialize`]:
//! write the bytes, hash what landed on disk, then apply mode and ownership.

use std::fs::OpenOptions;
use std::io::{self, Read};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use nix::unistd::{Gid, Uid, chown, getgid, getuid};

use crate::error::{Result, fs as fs_error};
use crate::hash;
use crate::manifest::{File, Mode};
use crate::record::InstallFile;

/// Permissions a new file is created with before its mode is applied
const CREATE_MODE: u32 = 0o600;

/// Permissions for directories created implicitly
const DIR_MODE: u32 = 0o755;

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

/// Create a directory and its missing parents
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
        .map_err(|e| fs_error::write_failed(path, e))
}

/// Owner for an entry, falling back to the process identity
pub fn resolve_owner(file: &File) -> (u32, u32) {
    (
        file.uid.unwrap_or_else(|| getuid().as_raw()),
        file.gid.unwrap_or_else(|| getgid().as_raw()),
    )
}

/// Apply `mode` when set, then ownership
pub fn apply_mode_and_owner(path: &Path, mode: Mode, uid: u32, gid: u32) -> Result<()> {
    if mode.is_set() {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode.bits()))
            .map_err(|e| fs_error::io_error(format!("chmod '{}' to {mode}: {e}", path.display())))?;
    }
    chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))).map_err(|e| {
        fs_error::io_error(format!("chown '{}' to {uid}:{gid}: {e}", path.display()))
    })
}

/// Write `contents` to `dest`, replacing what is there
fn write_contents(dest: &Path, contents: &mut impl Read) -> Result<()> {
    ensure_parent_dir(dest)?;
    let mut out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CREATE_MODE)
        .open(dest)
        .map_err(|e| fs_error::write_failed(dest, e))?;
    io::copy(contents, &mut out).map_err(|e| fs_error::write_failed(dest, e))?;
    out.sync_all().map_err(|e| fs_error::write_failed(dest, e))
}

/// Write one regular file for `file` and describe the result
pub fn materialize(file: &File, dest: PathBuf, contents: &mut impl Read) -> Result<InstallFile> {
    write_contents(&dest, contents)?;
    let hash = hash::hash_file(&dest)?;
    let (uid, gid) = resolve_owner(file);
    apply_mode_and_owner(&dest, file.mode, uid, gid)?;
    Ok(InstallFile::new(dest, file, uid, gid, hash))
}

/// Open a source file for reading
pub fn open_source(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => fs_error::not_found(path),
        _ => fs_error::read_failed(path, e),
    })
}
