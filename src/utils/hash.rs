//! Hash calculation utilities.

use crate::core::error::{Error, Result};
use md5::{Digest, Md5};
use sha2::Sha256;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffer size for reading files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Digests computed for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHashes {
    /// MD5 hash (legacy signature compatibility)
    pub md5: String,
    /// SHA256 hash
    pub sha256: String,
    /// File size in bytes
    pub size: u64,
}

/// Compute MD5 and SHA256 of a file in a single pass.
pub fn hash_file(path: &Path) -> Result<FileHashes> {
    let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| Error::file_read(path, e))?
        .len();

    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut md5_hasher = Md5::new();
    let mut sha256_hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::file_read(path, e))?;
        if bytes_read == 0 {
            break;
        }
        md5_hasher.update(&buffer[..bytes_read]);
        sha256_hasher.update(&buffer[..bytes_read]);
    }

    Ok(FileHashes {
        md5: hex::encode(md5_hasher.finalize()),
        sha256: hex::encode(sha256_hasher.finalize()),
        size,
    })
}

/// Compute SHA256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    Ok(hash_file(path)?.sha256)
}

/// Compute MD5 of a byte slice.
pub fn md5_bytes(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Check whether a file's SHA256 matches an expected digest, ignoring case.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<bool> {
    Ok(sha256_file(path)?.eq_ignore_ascii_case(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sha256_bytes() {
        // Test vector: SHA256("hello")
        assert_eq!(
            sha256_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_md5_bytes() {
        // Test vector: MD5("hello")
        assert_eq!(md5_bytes(b"hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_hash_file_single_pass() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let hashes = hash_file(file.path()).unwrap();
        assert_eq!(hashes.md5, md5_bytes(b"hello"));
        assert_eq!(hashes.sha256, sha256_bytes(b"hello"));
        assert_eq!(hashes.size, 5);
    }

    #[test]
    fn test_verify_sha256_case_insensitive() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let upper = sha256_bytes(b"hello").to_uppercase();
        assert!(verify_sha256(file.path(), &upper).unwrap());
        assert!(!verify_sha256(file.path(), "deadbeef").unwrap());
    }

    #[test]
    fn test_missing_file_errors() {
        let result = hash_file(Path::new("/nonexistent/file.bin"));
        assert!(result.is_err());
        assert!(result.unwrap_err().is_recoverable());
    }
}
