//! Known-malware signature table.
//!
//! The table maps MD5 and SHA256 digests to threat descriptions. A small
//! built-in set ships with the binary; additional entries can be merged in
//! from a versioned JSON signature file.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// EICAR test file MD5 hash.
pub const EICAR_MD5: &str = "44d88612fea8a8f36de82e1278abb02f";

/// EICAR test file SHA256 hash.
pub const EICAR_SHA256: &str = "275a021bbfb6489e54d471899f7db9d1663fc695ec2fe2a2c4538aabf651fd0f";

/// One known-malware signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Threat name (e.g. "Trojan.Generic")
    pub name: String,
    /// MD5 digest, lowercase hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    /// SHA256 digest, lowercase hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Description shown to the user
    pub description: String,
}

impl SignatureEntry {
    pub fn new(
        name: impl Into<String>,
        md5: Option<String>,
        sha256: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            md5: md5.map(|h| h.to_lowercase()),
            sha256: sha256.map(|h| h.to_lowercase()),
            description: description.into(),
        }
    }
}

/// Signature file format for signature updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureFile {
    /// Database version (e.g. "2025.08.01")
    pub version: String,
    /// Timestamp of last update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Signature entries
    pub signatures: Vec<SignatureEntry>,
}

impl SignatureFile {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
            signatures: Vec::new(),
        }
    }

    /// Load a signature file from JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::SignatureLoad(format!("Failed to parse signature file: {}", e)))
    }

    /// Save the signature file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::file_write(path, e))?;
        }
        std::fs::write(path, contents).map_err(|e| Error::file_write(path, e))
    }
}

/// In-memory signature table with hash-indexed lookup.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    entries: Vec<SignatureEntry>,
    by_md5: HashMap<String, usize>,
    by_sha256: HashMap<String, usize>,
}

impl SignatureTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_md5: HashMap::new(),
            by_sha256: HashMap::new(),
        }
    }

    /// Table of signatures shipped with the binary.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(SignatureEntry::new(
            "EICAR-Test-File",
            Some(EICAR_MD5.to_string()),
            Some(EICAR_SHA256.to_string()),
            "EICAR antivirus test file. Harmless, used to verify scanner operation.",
        ));
        table.insert(SignatureEntry::new(
            "Trojan.Generic.KD",
            Some("e44a5899f7db9d1663fc695ec2fe2a2c".to_string()),
            None,
            "Generic trojan dropper observed in cracked software bundles.",
        ));
        table.insert(SignatureEntry::new(
            "Worm.AutoRun.Gen",
            Some("7bd4cbef4a92e02c26cbeba2b0b5a28e".to_string()),
            None,
            "Autorun worm spreading through removable drives.",
        ));
        table.insert(SignatureEntry::new(
            "Spyware.Keylogger.A",
            None,
            Some("4a61b0c11b5ad4de814e28a1c6e908b27e8f3ec6c1a46d05fd36ea6e8f0c9b21".to_string()),
            "Keystroke logger that exfiltrates captured input.",
        ));
        table.insert(SignatureEntry::new(
            "Adware.BrowserHijack",
            None,
            Some("b9c2d1f70a834c5de6a4c4e0b2f86c6591f1f3dd0c29e4a6872f6e4d8a2c1b37".to_string()),
            "Browser hijacker that rewrites the default search provider.",
        ));
        table
    }

    /// Insert an entry, replacing existing hash mappings on collision.
    pub fn insert(&mut self, entry: SignatureEntry) {
        let index = self.entries.len();
        if let Some(ref md5) = entry.md5 {
            self.by_md5.insert(md5.to_lowercase(), index);
        }
        if let Some(ref sha256) = entry.sha256 {
            self.by_sha256.insert(sha256.to_lowercase(), index);
        }
        self.entries.push(entry);
    }

    /// Merge all entries from a signature file.
    pub fn merge_file(&mut self, file: &SignatureFile) {
        for entry in &file.signatures {
            self.insert(entry.clone());
        }
        log::info!(
            "Merged {} signature(s) from file version {}",
            file.signatures.len(),
            file.version
        );
    }

    /// Look up by either digest. Comparison is case-insensitive.
    pub fn lookup(&self, md5: &str, sha256: &str) -> Option<&SignatureEntry> {
        self.lookup_sha256(sha256).or_else(|| self.lookup_md5(md5))
    }

    pub fn lookup_md5(&self, md5: &str) -> Option<&SignatureEntry> {
        self.by_md5
            .get(&md5.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    pub fn lookup_sha256(&self, sha256: &str) -> Option<&SignatureEntry> {
        self.by_sha256
            .get(&sha256.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SignatureEntry] {
        &self.entries
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_has_eicar() {
        let table = SignatureTable::builtin();
        assert!(table.len() >= 5);

        let entry = table.lookup_sha256(EICAR_SHA256).unwrap();
        assert_eq!(entry.name, "EICAR-Test-File");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = SignatureTable::builtin();
        assert!(table.lookup_sha256(&EICAR_SHA256.to_uppercase()).is_some());
        assert!(table.lookup_md5(&EICAR_MD5.to_uppercase()).is_some());
    }

    #[test]
    fn test_lookup_miss() {
        let table = SignatureTable::builtin();
        assert!(table.lookup("0".repeat(32).as_str(), "0".repeat(64).as_str()).is_none());
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SignatureTable::new();
        table.insert(SignatureEntry::new(
            "Test.Threat",
            Some("ABCDEF0123456789ABCDEF0123456789".to_string()),
            None,
            "test",
        ));

        // Stored lowercase, looked up in any case
        let entry = table.lookup_md5("abcdef0123456789abcdef0123456789").unwrap();
        assert_eq!(entry.name, "Test.Threat");
    }

    #[test]
    fn test_signature_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigs.json");

        let mut file = SignatureFile::new("2025.08.01");
        file.signatures.push(SignatureEntry::new(
            "Trojan.Test",
            None,
            Some("a".repeat(64)),
            "test trojan",
        ));
        file.save(&path).unwrap();

        let loaded = SignatureFile::load(&path).unwrap();
        assert_eq!(loaded.version, "2025.08.01");
        assert_eq!(loaded.signatures.len(), 1);

        let mut table = SignatureTable::new();
        table.merge_file(&loaded);
        assert!(table.lookup_sha256(&"a".repeat(64)).is_some());
    }
}
