//! Absolute base directory for temporary files, so a relative `TMPDIR`
//! never places them under the current working directory.

use std::env;
use std::path::PathBuf;

/// Directory under which temporary directories are created
pub fn temp_dir_base() -> PathBuf {
    let dir = env::temp_dir();
    if dir.is_absolute() {
        dir
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
