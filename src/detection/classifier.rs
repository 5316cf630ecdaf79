//! Per-file threat classifier.
//!
//! Applies the signature table and heuristic rule set to one file and
//! produces a cumulative score. Every rule contributes independently; the
//! final score is mapped onto a risk tier, and files below the reporting
//! threshold produce no record at all.

use crate::core::error::{Error, Result};
use crate::core::types::{Severity, ThreatRecord, ThreatType};
use crate::detection::rules::{
    self, FilenameRules, SCORE_BEHAVIOR, SCORE_CONTENT, SCORE_EXTENSION, SCORE_FILENAME,
    SCORE_HASH_MATCH, THRESHOLD_HIGH, THRESHOLD_MEDIUM,
};
use crate::detection::signature::SignatureTable;
use crate::utils::hash;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// How much of a file's head is searched for content patterns.
pub const CONTENT_SNIFF_LIMIT: u64 = 1024 * 1024;

/// Rule-based file classifier.
pub struct FileClassifier {
    signatures: Arc<SignatureTable>,
    filename_rules: FilenameRules,
    /// Minimum cumulative score for a file to be reported
    report_threshold: u32,
}

impl FileClassifier {
    /// Create a classifier over the given signature table.
    pub fn new(signatures: Arc<SignatureTable>) -> Self {
        Self {
            signatures,
            filename_rules: FilenameRules::new(),
            report_threshold: rules::THRESHOLD_LOW,
        }
    }

    /// Override the reporting threshold.
    pub fn with_report_threshold(mut self, threshold: u32) -> Self {
        self.report_threshold = threshold;
        self
    }

    /// Classify a single file.
    ///
    /// Returns `Ok(None)` for files that match no rule (or stay below the
    /// reporting threshold). I/O failures are returned as recoverable errors
    /// so the scan can count and skip the file.
    pub fn classify(&self, path: &Path) -> Result<Option<ThreatRecord>> {
        let metadata = std::fs::metadata(path).map_err(|e| Error::file_read(path, e))?;
        if !metadata.is_file() {
            return Ok(None);
        }
        let size = metadata.len();

        let hashes = hash::hash_file(path)?;

        let mut score = 0u32;
        let mut indicators = Vec::new();

        // 1. Signature table lookup
        let signature = self.signatures.lookup(&hashes.md5, &hashes.sha256);
        if let Some(sig) = signature {
            score += SCORE_HASH_MATCH;
            indicators.push(format!("Signature match: {}", sig.name));
        }

        // 2. Filename substrings
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let filename_hit = self.filename_rules.matches(&file_name);
        if let Some(ref word) = filename_hit {
            score += SCORE_FILENAME;
            indicators.push(format!("Filename contains '{}'", word));
        }

        // 3. Behavioral indicators
        let ext = rules::extension_of(path);
        let is_executable = rules::is_executable_extension(&ext);
        if is_executable && rules::size_out_of_band(size) {
            score += SCORE_BEHAVIOR;
            indicators.push(format!("Executable size out of band ({} bytes)", size));
        }
        if is_executable && rules::created_recently(&metadata) {
            score += SCORE_BEHAVIOR;
            indicators.push("Executable created within the last hour".to_string());
        }
        if rules::has_double_extension(path) {
            score += SCORE_BEHAVIOR;
            indicators.push("Double extension disguising an executable".to_string());
        }

        // 4. Content patterns in the file head
        let head = self.read_head(path)?;
        for hit in rules::content_pattern_hits(&head) {
            score += SCORE_CONTENT;
            indicators.push(format!("Content references {}", hit));
        }

        // 5. Extension denylist, at most one point
        if rules::is_denylisted_extension(&ext) {
            score += SCORE_EXTENSION;
            indicators.push(format!("Denylisted extension .{}", ext));
        }

        // A signature hit is definitive regardless of the rest of the score.
        if let Some(sig) = signature {
            let record = ThreatRecord::new(
                path.to_path_buf(),
                ThreatType::KnownMalware,
                Severity::High,
                sig.description.clone(),
                size,
            )
            .with_score(score)
            .with_indicators(indicators)
            .with_hashes(hashes.md5, hashes.sha256);
            return Ok(Some(record));
        }

        if score < self.report_threshold {
            return Ok(None);
        }

        let (threat_type, severity) = if score >= THRESHOLD_HIGH {
            (ThreatType::HighRisk, Severity::High)
        } else if score >= THRESHOLD_MEDIUM {
            // Name-based suspicion is weaker evidence than accumulated
            // behavioral/content hits, so it gets its own label.
            if filename_hit.is_some() {
                (ThreatType::Suspicious, Severity::Medium)
            } else {
                (ThreatType::MediumRisk, Severity::Medium)
            }
        } else {
            (ThreatType::LowRisk, Severity::Low)
        };

        let description = indicators
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");

        let record = ThreatRecord::new(path.to_path_buf(), threat_type, severity, description, size)
            .with_score(score)
            .with_indicators(indicators)
            .with_hashes(hashes.md5, hashes.sha256);

        Ok(Some(record))
    }

    /// Read up to [`CONTENT_SNIFF_LIMIT`] bytes from the start of the file.
    fn read_head(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let mut buffer = Vec::new();
        file.take(CONTENT_SNIFF_LIMIT)
            .read_to_end(&mut buffer)
            .map_err(|e| Error::file_read(path, e))?;
        Ok(buffer)
    }
}
