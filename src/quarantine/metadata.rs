//! Durable quarantine metadata.
//!
//! Entries are persisted to a flat JSON file alongside the quarantined
//! items, so original paths survive restarts. The file is read permissively:
//! missing or unparseable metadata yields an empty store with a warning
//! rather than an error.

use crate::core::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the metadata file inside the quarantine directory.
pub const METADATA_FILE: &str = "quarantine.json";

/// Metadata for one quarantined file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineEntry {
    /// Unique identifier (UUID)
    pub id: String,
    /// Where the file lived before quarantine
    pub original_path: PathBuf,
    /// Where the file sits inside the quarantine directory
    pub quarantine_path: PathBuf,
    /// Original file name
    pub file_name: String,
    /// File size in bytes
    pub size: u64,
    /// SHA256 of the file at quarantine time
    pub sha256: String,
    /// Why the file was quarantined (threat description)
    pub reason: String,
    /// When the file was quarantined
    pub quarantined_at: DateTime<Utc>,
}

/// JSON-file-backed store of quarantine entries.
pub struct MetadataStore {
    path: PathBuf,
    entries: Vec<QuarantineEntry>,
}

impl MetadataStore {
    /// Load the store from the given quarantine directory.
    pub fn load(quarantine_dir: &Path) -> Self {
        let path = quarantine_dir.join(METADATA_FILE);

        let entries = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(entries) => entries,
                    Err(e) => {
                        log::warn!("Unreadable quarantine metadata, starting empty: {}", e);
                        Vec::new()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read quarantine metadata: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self { path, entries }
    }

    /// Write the store back to disk.
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryAccess {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, contents).map_err(|e| Error::file_write(&self.path, e))
    }

    pub fn add(&mut self, entry: QuarantineEntry) {
        self.entries.push(entry);
    }

    /// Remove an entry by id, returning it when present.
    pub fn remove(&mut self, id: &str) -> Option<QuarantineEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&QuarantineEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look up an entry by content hash.
    pub fn get_by_sha256(&self, sha256: &str) -> Option<&QuarantineEntry> {
        self.entries
            .iter()
            .find(|e| e.sha256.eq_ignore_ascii_case(sha256))
    }

    pub fn list(&self) -> &[QuarantineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}
