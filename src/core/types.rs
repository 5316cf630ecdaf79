//! Core type definitions shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level attached to a threat record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low risk - worth a look, not necessarily malicious
    Low,
    /// Medium risk - suspicious behavior detected
    Medium,
    /// High risk - likely or confirmed malicious
    High,
}

impl Severity {
    /// Get string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// Classification assigned to a flagged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    /// Exact hash match against the signature table
    KnownMalware,
    /// Name-based suspicion without stronger evidence
    Suspicious,
    /// Cumulative heuristic score in the high band
    HighRisk,
    /// Cumulative heuristic score in the medium band
    MediumRisk,
    /// Cumulative heuristic score in the low band
    LowRisk,
}

impl ThreatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatType::KnownMalware => "known_malware",
            ThreatType::Suspicious => "suspicious",
            ThreatType::HighRisk => "high_risk",
            ThreatType::MediumRisk => "medium_risk",
            ThreatType::LowRisk => "low_risk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "known_malware" => Some(ThreatType::KnownMalware),
            "suspicious" => Some(ThreatType::Suspicious),
            "high_risk" => Some(ThreatType::HighRisk),
            "medium_risk" => Some(ThreatType::MediumRisk),
            "low_risk" => Some(ThreatType::LowRisk),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThreatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatType::KnownMalware => write!(f, "Known Malware"),
            ThreatType::Suspicious => write!(f, "Suspicious"),
            ThreatType::HighRisk => write!(f, "High Risk"),
            ThreatType::MediumRisk => write!(f, "Medium Risk"),
            ThreatType::LowRisk => write!(f, "Low Risk"),
        }
    }
}

/// A single flagged file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatRecord {
    /// Path of the flagged file
    pub path: PathBuf,
    /// Classification
    pub threat_type: ThreatType,
    /// Human-readable reason (signature description or indicator summary)
    pub description: String,
    /// Severity level
    pub severity: Severity,
    /// File size in bytes
    pub size: u64,
    /// When the file was flagged
    pub detected_at: DateTime<Utc>,
    /// Cumulative heuristic score that produced this record
    pub score: u32,
    /// Individual rule hits that contributed to the score
    #[serde(default)]
    pub indicators: Vec<String>,
    /// MD5 of the file contents, when computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    /// SHA256 of the file contents, when computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ThreatRecord {
    pub fn new(
        path: PathBuf,
        threat_type: ThreatType,
        severity: Severity,
        description: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path,
            threat_type,
            description: description.into(),
            severity,
            size,
            detected_at: Utc::now(),
            score: 0,
            indicators: Vec::new(),
            md5: None,
            sha256: None,
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn with_indicators(mut self, indicators: Vec<String>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_hashes(mut self, md5: impl Into<String>, sha256: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self.sha256 = Some(sha256.into());
        self
    }
}

/// Type of scan being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Common temp and download locations
    Quick,
    /// All mounted drives
    Full,
    /// User-selected paths
    Custom,
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanType::Quick => write!(f, "Quick Scan"),
            ScanType::Full => write!(f, "Full Scan"),
            ScanType::Custom => write!(f, "Custom Scan"),
        }
    }
}

/// Current status of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Cancelled => "cancelled",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ScanStatus::Pending),
            "running" => Some(ScanStatus::Running),
            "completed" => Some(ScanStatus::Completed),
            "cancelled" => Some(ScanStatus::Cancelled),
            "failed" => Some(ScanStatus::Failed),
            _ => None,
        }
    }
}

/// Summary of a scan, built up while the scan runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Unique scan identifier
    pub scan_id: String,
    /// Type of scan performed
    pub scan_type: ScanType,
    /// When the scan started
    pub start_time: DateTime<Utc>,
    /// When the scan ended
    pub end_time: Option<DateTime<Utc>>,
    /// Final status
    pub status: ScanStatus,
    /// Total files scanned
    pub files_scanned: u64,
    /// Total bytes scanned
    pub bytes_scanned: u64,
    /// Number of files skipped due to errors
    pub errors: u32,
    /// Number of threats found
    pub threats_found: u32,
    /// Flagged files
    pub records: Vec<ThreatRecord>,
}

impl ScanSummary {
    pub fn new(scan_type: ScanType) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            scan_type,
            start_time: Utc::now(),
            end_time: None,
            status: ScanStatus::Pending,
            files_scanned: 0,
            bytes_scanned: 0,
            errors: 0,
            threats_found: 0,
            records: Vec::new(),
        }
    }

    /// Scan duration in seconds, once finished.
    pub fn duration_secs(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds())
    }

    pub fn complete(&mut self) {
        self.end_time = Some(Utc::now());
        self.status = ScanStatus::Completed;
    }

    pub fn cancel(&mut self) {
        self.end_time = Some(Utc::now());
        self.status = ScanStatus::Cancelled;
    }

    pub fn fail(&mut self) {
        self.end_time = Some(Utc::now());
        self.status = ScanStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_threat_type_round_trip() {
        for t in [
            ThreatType::KnownMalware,
            ThreatType::Suspicious,
            ThreatType::HighRisk,
            ThreatType::MediumRisk,
            ThreatType::LowRisk,
        ] {
            assert_eq!(ThreatType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ThreatType::parse("nonsense"), None);
    }

    #[test]
    fn test_summary_lifecycle() {
        let mut summary = ScanSummary::new(ScanType::Custom);
        assert_eq!(summary.status, ScanStatus::Pending);
        assert!(summary.duration_secs().is_none());

        summary.complete();
        assert_eq!(summary.status, ScanStatus::Completed);
        assert!(summary.duration_secs().is_some());
    }

    #[test]
    fn test_record_builder() {
        let record = ThreatRecord::new(
            PathBuf::from("/tmp/evil.exe"),
            ThreatType::MediumRisk,
            Severity::Medium,
            "Suspicious filename",
            512,
        )
        .with_score(5)
        .with_indicators(vec!["Filename matches 'virus'".to_string()]);

        assert_eq!(record.score, 5);
        assert_eq!(record.indicators.len(), 1);
        assert!(record.sha256.is_none());
    }
}
