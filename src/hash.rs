//! SHA-256 content hashing for installed files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, fs as fs_error};

/// Hash prefix for SHA-256 hashes
pub const HASH_PREFIX: &str = "sha256:";

/// Calculate the SHA-256 hash of a file's contents
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| fs_error::read_failed(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_error::read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hex::encode(hasher.finalize())))
}

/// Calculate the SHA-256 hash of an in-memory buffer
#[cfg(test)]
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{}{}", HASH_PREFIX, hex::encode(Sha256::digest(bytes)))
}

/// Verify a hash matches the expected value
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    // Normalize both hashes (ensure prefix)
    let normalize = |h: &str| {
        if h.starts_with(HASH_PREFIX) {
            h.to_string()
        } else {
            format!("{HASH_PREFIX}{h}")
        }
    };

    normalize(expected) == normalize(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, "test content").unwrap();

        let hash = hash_file(&file_path).unwrap();
        assert!(hash.starts_with(HASH_PREFIX));
        assert_eq!(hash.len(), HASH_PREFIX.len() + 64);
    }

    #[test]
    fn test_hash_file_not_found() {
        let result = hash_file(Path::new("/nonexistent/file.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_known_value() {
        assert_eq!(
            hash_bytes(b"abc"),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_file_matches_hash_bytes() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file_path = temp.path().join("data.bin");
        let content = vec![7u8; 20_000];
        std::fs::write(&file_path, &content).unwrap();

        assert_eq!(hash_file(&file_path).unwrap(), hash_bytes(&content));
    }

    #[test]
    fn test_verify_hash() {
        let hash1 = format!("{HASH_PREFIX}abc123");
        let hash2 = hash1.clone();
        assert!(verify_hash(&hash1, &hash2));

        assert!(verify_hash(&hash1, "abc123"));

        let hash3 = format!("{HASH_PREFIX}def456");
        assert!(!verify_hash(&hash1, &hash3));
    }
}
