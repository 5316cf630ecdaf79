//! Quarantine manager.
//!
//! Flagged files are moved (not copied) into a holding directory under a
//! timestamp-qualified name, recorded in the durable metadata store, and can
//! later be restored to an explicit destination or their recorded original
//! path, or permanently deleted.

use crate::core::error::{Error, Result};
use crate::quarantine::metadata::{MetadataStore, QuarantineEntry};
use crate::quarantine::operations::SecureOperations;
use crate::utils::hash;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Summary figures for the quarantine directory.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuarantineStats {
    pub item_count: usize,
    pub total_size: u64,
}

/// Manager over one quarantine directory.
pub struct QuarantineManager {
    dir: PathBuf,
    store: MetadataStore,
    operations: SecureOperations,
}

impl QuarantineManager {
    /// Open (and create if needed) a quarantine directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| Error::DirectoryAccess {
            path: dir.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            store: MetadataStore::load(dir),
            operations: SecureOperations::new(),
        })
    }

    /// Open with a configured number of secure-delete passes.
    pub fn open_with_passes(dir: &Path, passes: usize) -> Result<Self> {
        let mut manager = Self::open(dir)?;
        manager.operations = SecureOperations::with_passes(passes);
        Ok(manager)
    }

    /// The quarantine directory this manager owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move a file into quarantine.
    ///
    /// The file keeps its name with a timestamp qualifier; a numeric suffix
    /// resolves remaining collisions. A file whose hash is already in
    /// quarantine is refused.
    pub fn quarantine(&mut self, path: &Path, reason: &str) -> Result<QuarantineEntry> {
        if !path.exists() {
            return Err(Error::quarantine_failed(path, "file does not exist"));
        }

        let hashes = hash::hash_file(path)
            .map_err(|e| Error::quarantine_failed(path, format!("hashing failed: {}", e)))?;

        if self.store.get_by_sha256(&hashes.sha256).is_some() {
            return Err(Error::quarantine_failed(path, "file already quarantined"));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let dest = self.allocate_name(&file_name);
        self.operations.safe_move(path, &dest)?;

        let entry = QuarantineEntry {
            id: Uuid::new_v4().to_string(),
            original_path: path.to_path_buf(),
            quarantine_path: dest,
            file_name,
            size: hashes.size,
            sha256: hashes.sha256,
            reason: reason.to_string(),
            quarantined_at: Utc::now(),
        };

        self.store.add(entry.clone());
        self.store.save()?;

        log::info!("Quarantined {:?} as {:?}", entry.original_path, entry.quarantine_path);
        Ok(entry)
    }

    /// Restore a quarantined item.
    ///
    /// The caller may supply the destination; otherwise the recorded
    /// original path is used. An existing file at the destination is never
    /// overwritten.
    pub fn restore(&mut self, id: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let entry = self
            .store
            .get(id)
            .ok_or_else(|| Error::QuarantineItemNotFound(id.to_string()))?
            .clone();

        if !entry.quarantine_path.exists() {
            return Err(Error::RestoreFailed {
                id: id.to_string(),
                reason: "quarantined file is missing on disk".to_string(),
            });
        }

        let target = dest
            .map(Path::to_path_buf)
            .unwrap_or_else(|| entry.original_path.clone());

        if target.exists() {
            return Err(Error::RestoreFailed {
                id: id.to_string(),
                reason: format!("destination already exists: {}", target.display()),
            });
        }

        self.operations.safe_move(&entry.quarantine_path, &target)?;

        self.store.remove(id);
        self.store.save()?;

        log::info!("Restored {:?} to {:?}", entry.quarantine_path, target);
        Ok(target)
    }

    /// Permanently delete a quarantined item.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let entry = self
            .store
            .get(id)
            .ok_or_else(|| Error::QuarantineItemNotFound(id.to_string()))?
            .clone();

        if entry.quarantine_path.exists() {
            self.operations.secure_delete(&entry.quarantine_path)?;
        }

        self.store.remove(id);
        self.store.save()?;

        log::info!("Deleted quarantined item {} ({:?})", id, entry.file_name);
        Ok(())
    }

    /// Delete every quarantined item. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let ids: Vec<String> = self.store.list().iter().map(|e| e.id.clone()).collect();
        let count = ids.len();
        for id in ids {
            self.delete(&id)?;
        }
        Ok(count)
    }

    pub fn list(&self) -> &[QuarantineEntry] {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Option<&QuarantineEntry> {
        self.store.get(id)
    }

    pub fn stats(&self) -> QuarantineStats {
        QuarantineStats {
            item_count: self.store.len(),
            total_size: self.store.total_size(),
        }
    }

    /// Pick a non-colliding destination name inside the quarantine directory.
    fn allocate_name(&self, file_name: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let base = format!("{}.{}", file_name, stamp);

        let candidate = self.dir.join(&base);
        if !candidate.exists() {
            return candidate;
        }

        let mut counter = 1u32;
        loop {
            let candidate = self.dir.join(format!("{}-{}", base, counter));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, QuarantineManager) {
        let temp = TempDir::new().unwrap();
        let files = temp.path().join("files");
        fs::create_dir_all(&files).unwrap();
        let manager = QuarantineManager::open(&temp.path().join("vault")).unwrap();
        (temp, files, manager)
    }

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_quarantine_moves_file() {
        let (_temp, files, mut manager) = setup();
        let path = write_file(&files, "threat.exe", b"malicious bytes");

        let entry = manager.quarantine(&path, "Suspicious filename").unwrap();

        assert!(!path.exists());
        assert!(entry.quarantine_path.exists());
        assert_eq!(entry.file_name, "threat.exe");
        assert_eq!(manager.stats().item_count, 1);
    }

    #[test]
    fn test_quarantine_restore_round_trip() {
        let (_temp, files, mut manager) = setup();
        let content = b"exact bytes that must survive the round trip";
        let path = write_file(&files, "roundtrip.bin", content);

        let entry = manager.quarantine(&path, "test").unwrap();
        let restored = manager.restore(&entry.id, Some(&path)).unwrap();

        assert_eq!(restored, path);
        assert_eq!(fs::read(&path).unwrap(), content);
        assert!(manager.list().is_empty());
    }

    #[test]
    fn test_restore_defaults_to_original_path() {
        let (_temp, files, mut manager) = setup();
        let content = b"original location";
        let path = write_file(&files, "original.doc", content);

        let entry = manager.quarantine(&path, "test").unwrap();
        let restored = manager.restore(&entry.id, None).unwrap();

        assert_eq!(restored, path);
        assert_eq!(fs::read(&path).unwrap(), content);
    }

    #[test]
    fn test_restore_refuses_to_overwrite() {
        let (_temp, files, mut manager) = setup();
        let path = write_file(&files, "taken.txt", b"v1");

        let entry = manager.quarantine(&path, "test").unwrap();
        // Something else now occupies the original path
        fs::write(&path, b"v2").unwrap();

        let err = manager.restore(&entry.id, None).unwrap_err();
        assert!(matches!(err, Error::RestoreFailed { .. }));
        // Item stays in quarantine
        assert_eq!(manager.stats().item_count, 1);
    }

    #[test]
    fn test_name_collision_gets_suffix() {
        let (_temp, files, mut manager) = setup();
        let first = write_file(&files, "same.exe", b"one");
        let a = manager.quarantine(&first, "test").unwrap();

        // Same original name, usually quarantined within the same second
        let clone = write_file(&files, "same.exe", b"different content");
        let b = manager.quarantine(&clone, "test").unwrap();

        assert_ne!(a.quarantine_path, b.quarantine_path);
        assert!(a.quarantine_path.exists());
        assert!(b.quarantine_path.exists());
    }

    #[test]
    fn test_duplicate_content_refused() {
        let (_temp, files, mut manager) = setup();
        let first = write_file(&files, "dupe_a.exe", b"identical payload");
        let second = write_file(&files, "dupe_b.exe", b"identical payload");

        manager.quarantine(&first, "test").unwrap();
        let err = manager.quarantine(&second, "test").unwrap_err();
        assert!(err.to_string().contains("already quarantined"));
    }

    #[test]
    fn test_quarantine_missing_file() {
        let (_temp, files, mut manager) = setup();
        let err = manager
            .quarantine(&files.join("ghost.exe"), "test")
            .unwrap_err();
        assert!(matches!(err, Error::QuarantineFailed { .. }));
    }

    #[test]
    fn test_delete_removes_item_and_file() {
        let (_temp, files, mut manager) = setup();
        let path = write_file(&files, "doomed.exe", b"bytes");

        let entry = manager.quarantine(&path, "test").unwrap();
        manager.delete(&entry.id).unwrap();

        assert!(!entry.quarantine_path.exists());
        assert!(manager.list().is_empty());
        assert!(matches!(
            manager.restore(&entry.id, None).unwrap_err(),
            Error::QuarantineItemNotFound(_)
        ));
    }

    #[test]
    fn test_metadata_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let files = temp.path().join("files");
        fs::create_dir_all(&files).unwrap();
        let vault = temp.path().join("vault");
        let path = write_file(&files, "persist.exe", b"still here");

        let entry_id = {
            let mut manager = QuarantineManager::open(&vault).unwrap();
            manager.quarantine(&path, "test").unwrap().id
        };

        let manager = QuarantineManager::open(&vault).unwrap();
        let entry = manager.get(&entry_id).unwrap();
        assert_eq!(entry.original_path, path);
    }

    #[test]
    fn test_clear() {
        let (_temp, files, mut manager) = setup();
        manager
            .quarantine(&write_file(&files, "one.exe", b"1"), "test")
            .unwrap();
        manager
            .quarantine(&write_file(&files, "two.exe", b"2"), "test")
            .unwrap();

        assert_eq!(manager.clear().unwrap(), 2);
        assert_eq!(manager.stats().item_count, 0);
    }
}
