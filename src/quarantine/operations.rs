//! Low-level file operations used by the quarantine manager.

use crate::core::error::{Error, Result};
use rand::RngCore;
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

/// Default number of overwrite passes for secure deletion.
const SECURE_DELETE_PASSES: usize = 3;

/// Move and delete primitives with cross-volume fallbacks.
pub struct SecureOperations {
    overwrite_passes: usize,
}

impl SecureOperations {
    pub fn new() -> Self {
        Self {
            overwrite_passes: SECURE_DELETE_PASSES,
        }
    }

    pub fn with_passes(passes: usize) -> Self {
        Self {
            overwrite_passes: passes.max(1),
        }
    }

    /// Move a file with copy-then-delete semantics.
    ///
    /// Rename is tried first; when it fails (typically across filesystems)
    /// the file is copied, the copy size-verified, and the source removed.
    pub fn safe_move(&self, source: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::DirectoryAccess {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        if fs::rename(source, dest).is_ok() {
            return Ok(());
        }

        fs::copy(source, dest).map_err(|e| Error::file_write(dest, e))?;

        let source_size = fs::metadata(source)
            .map_err(|e| Error::file_read(source, e))?
            .len();
        let dest_size = fs::metadata(dest)
            .map_err(|e| Error::file_read(dest, e))?
            .len();

        if source_size != dest_size {
            let _ = fs::remove_file(dest);
            return Err(Error::Internal("File copy verification failed".to_string()));
        }

        fs::remove_file(source).map_err(|e| Error::FileDelete {
            path: source.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Delete a file after overwriting its content with random data.
    pub fn secure_delete(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let file_size = fs::metadata(path)
            .map_err(|e| Error::file_read(path, e))?
            .len() as usize;

        if file_size > 0 {
            for _ in 0..self.overwrite_passes {
                self.overwrite_with_random(path, file_size)?;
            }
        }

        fs::remove_file(path).map_err(|e| Error::FileDelete {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn overwrite_with_random(&self, path: &Path, size: usize) -> Result<()> {
        const CHUNK_SIZE: usize = 8192;

        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| Error::file_write(path, e))?;

        let mut rng = rand::thread_rng();
        let mut buffer = vec![0u8; CHUNK_SIZE.min(size)];
        let mut remaining = size;

        file.seek(SeekFrom::Start(0))
            .map_err(|e| Error::file_write(path, e))?;

        while remaining > 0 {
            let write_size = remaining.min(CHUNK_SIZE);
            rng.fill_bytes(&mut buffer[..write_size]);
            file.write_all(&buffer[..write_size])
                .map_err(|e| Error::file_write(path, e))?;
            remaining -= write_size;
        }

        file.sync_all().map_err(|e| Error::file_write(path, e))?;
        Ok(())
    }

    /// Plain delete without overwrite.
    pub fn simple_delete(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| Error::FileDelete {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl Default for SecureOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_move_creates_parent() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let dest = dir.path().join("sub").join("dest.txt");

        let content = b"content to move";
        fs::write(&source, content).unwrap();

        SecureOperations::new().safe_move(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), content);
    }

    #[test]
    fn test_secure_delete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wipe_me.bin");
        fs::write(&path, b"sensitive bytes").unwrap();

        SecureOperations::new().secure_delete(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_secure_delete_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        SecureOperations::new()
            .secure_delete(&dir.path().join("ghost.bin"))
            .unwrap();
    }

    #[test]
    fn test_passes_floor() {
        let ops = SecureOperations::with_passes(0);
        assert_eq!(ops.overwrite_passes, 1);
    }

    #[test]
    fn test_simple_delete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, b"x").unwrap();

        SecureOperations::new().simple_delete(&path).unwrap();
        assert!(!path.exists());
    }
}
