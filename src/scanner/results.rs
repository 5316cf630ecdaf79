//! Scan history persistence.
//!
//! Summaries and their threat records are stored in SQLite so past scans
//! survive restarts and can be listed, inspected, and pruned.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{
    ScanStatus, ScanSummary, ScanType, Severity, ThreatRecord, ThreatType,
};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const DEFAULT_HISTORY_DB: &str = "scan_history.db";

/// Aggregate statistics over all stored scans.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanStatistics {
    pub total_scans: u64,
    pub total_files_scanned: u64,
    pub total_bytes_scanned: u64,
    pub total_threats_found: u64,
    pub last_scan_time: Option<chrono::DateTime<Utc>>,
}

/// SQLite-backed scan history store.
pub struct ScanResultStore {
    conn: Mutex<Connection>,
}

impl ScanResultStore {
    /// Open or create a history store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::DatabaseInit(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open the store at the default location under the data directory.
    pub fn open_default() -> Result<Self> {
        let data_dir = Config::data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| Error::DirectoryAccess {
            path: data_dir.clone(),
            source: e,
        })?;
        Self::open(&data_dir.join(DEFAULT_HISTORY_DB))
    }

    /// In-memory store for testing.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::DatabaseInit(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scans (
                scan_id TEXT PRIMARY KEY,
                scan_type TEXT NOT NULL,
                start_time INTEGER NOT NULL,
                end_time INTEGER,
                status TEXT NOT NULL,
                files_scanned INTEGER NOT NULL DEFAULT 0,
                bytes_scanned INTEGER NOT NULL DEFAULT 0,
                errors INTEGER NOT NULL DEFAULT 0,
                threats_found INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS threat_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scan_id TEXT NOT NULL,
                path TEXT NOT NULL,
                threat_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                description TEXT NOT NULL,
                size INTEGER NOT NULL,
                detected_at INTEGER NOT NULL,
                score INTEGER NOT NULL DEFAULT 0,
                md5 TEXT,
                sha256 TEXT,
                FOREIGN KEY (scan_id) REFERENCES scans(scan_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_scans_start_time ON scans(start_time DESC);
            CREATE INDEX IF NOT EXISTS idx_records_scan_id ON threat_records(scan_id);
            "#,
        )
        .map_err(|e| Error::DatabaseInit(e.to_string()))?;

        Ok(())
    }

    /// Persist a scan summary and its threat records.
    pub fn save_scan(&self, summary: &ScanSummary) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO scans
            (scan_id, scan_type, start_time, end_time, status, files_scanned,
             bytes_scanned, errors, threats_found)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                summary.scan_id,
                scan_type_str(summary.scan_type),
                summary.start_time.timestamp(),
                summary.end_time.map(|t| t.timestamp()),
                summary.status.as_str(),
                summary.files_scanned as i64,
                summary.bytes_scanned as i64,
                summary.errors,
                summary.threats_found,
            ],
        )?;

        conn.execute(
            "DELETE FROM threat_records WHERE scan_id = ?1",
            [&summary.scan_id],
        )?;

        for record in &summary.records {
            conn.execute(
                r#"
                INSERT INTO threat_records
                (scan_id, path, threat_type, severity, description, size,
                 detected_at, score, md5, sha256)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    summary.scan_id,
                    record.path.to_string_lossy(),
                    record.threat_type.as_str(),
                    record.severity.as_str(),
                    record.description,
                    record.size as i64,
                    record.detected_at.timestamp(),
                    record.score,
                    record.md5,
                    record.sha256,
                ],
            )?;
        }

        Ok(())
    }

    /// List the most recent scans, newest first, without their records.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<ScanSummary>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT scan_id, scan_type, start_time, end_time, status,
                   files_scanned, bytes_scanned, errors, threats_found
            FROM scans ORDER BY start_time DESC LIMIT ?1
            "#,
        )?;

        let summaries = stmt
            .query_map([limit as i64], row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Fetch one scan with its threat records.
    pub fn get_scan(&self, scan_id: &str) -> Result<Option<ScanSummary>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        let summary = conn
            .query_row(
                r#"
                SELECT scan_id, scan_type, start_time, end_time, status,
                       files_scanned, bytes_scanned, errors, threats_found
                FROM scans WHERE scan_id = ?1
                "#,
                [scan_id],
                row_to_summary,
            )
            .optional()?;

        let mut summary = match summary {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT path, threat_type, severity, description, size, detected_at,
                   score, md5, sha256
            FROM threat_records WHERE scan_id = ?1
            "#,
        )?;

        summary.records = stmt
            .query_map([scan_id], |row| {
                Ok(ThreatRecord {
                    path: std::path::PathBuf::from(row.get::<_, String>(0)?),
                    threat_type: ThreatType::parse(&row.get::<_, String>(1)?)
                        .unwrap_or(ThreatType::Suspicious),
                    severity: Severity::parse(&row.get::<_, String>(2)?)
                        .unwrap_or(Severity::Low),
                    description: row.get(3)?,
                    size: row.get::<_, i64>(4)? as u64,
                    detected_at: Utc
                        .timestamp_opt(row.get::<_, i64>(5)?, 0)
                        .single()
                        .unwrap_or_else(Utc::now),
                    score: row.get::<_, i64>(6)? as u32,
                    indicators: Vec::new(),
                    md5: row.get(7)?,
                    sha256: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(summary))
    }

    /// Aggregate statistics over the stored history.
    pub fn stats(&self) -> Result<ScanStatistics> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(files_scanned), 0),
                   COALESCE(SUM(bytes_scanned), 0),
                   COALESCE(SUM(threats_found), 0), MAX(start_time)
            FROM scans
            "#,
            [],
            |row| {
                Ok(ScanStatistics {
                    total_scans: row.get::<_, i64>(0)? as u64,
                    total_files_scanned: row.get::<_, i64>(1)? as u64,
                    total_bytes_scanned: row.get::<_, i64>(2)? as u64,
                    total_threats_found: row.get::<_, i64>(3)? as u64,
                    last_scan_time: row
                        .get::<_, Option<i64>>(4)?
                        .and_then(|t| Utc.timestamp_opt(t, 0).single()),
                })
            },
        )
        .map_err(Error::from)
    }

    /// Delete scans older than the given number of days. Returns how many
    /// scans were removed.
    pub fn prune_older_than(&self, days: u32) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::lock_poisoned("scan history database"))?;

        let cutoff = Utc::now().timestamp() - i64::from(days) * 24 * 60 * 60;
        conn.execute(
            "DELETE FROM threat_records WHERE scan_id IN \
             (SELECT scan_id FROM scans WHERE start_time < ?1)",
            [cutoff],
        )?;
        let removed = conn.execute("DELETE FROM scans WHERE start_time < ?1", [cutoff])?;
        Ok(removed)
    }
}

fn scan_type_str(scan_type: ScanType) -> &'static str {
    match scan_type {
        ScanType::Quick => "quick",
        ScanType::Full => "full",
        ScanType::Custom => "custom",
    }
}

fn parse_scan_type(s: &str) -> ScanType {
    match s {
        "quick" => ScanType::Quick,
        "full" => ScanType::Full,
        _ => ScanType::Custom,
    }
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScanSummary> {
    Ok(ScanSummary {
        scan_id: row.get(0)?,
        scan_type: parse_scan_type(&row.get::<_, String>(1)?),
        start_time: Utc
            .timestamp_opt(row.get::<_, i64>(2)?, 0)
            .single()
            .unwrap_or_else(Utc::now),
        end_time: row
            .get::<_, Option<i64>>(3)?
            .and_then(|t| Utc.timestamp_opt(t, 0).single()),
        status: ScanStatus::parse(&row.get::<_, String>(4)?).unwrap_or(ScanStatus::Failed),
        files_scanned: row.get::<_, i64>(5)? as u64,
        bytes_scanned: row.get::<_, i64>(6)? as u64,
        errors: row.get::<_, i64>(7)? as u32,
        threats_found: row.get::<_, i64>(8)? as u32,
        records: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_summary() -> ScanSummary {
        let mut summary = ScanSummary::new(ScanType::Custom);
        summary.files_scanned = 42;
        summary.bytes_scanned = 1024;
        summary.threats_found = 1;
        summary.records.push(
            ThreatRecord::new(
                PathBuf::from("/tmp/bad.scr"),
                ThreatType::MediumRisk,
                Severity::Medium,
                "Denylisted extension .scr",
                512,
            )
            .with_score(6),
        );
        summary.complete();
        summary
    }

    #[test]
    fn test_save_and_get() {
        let store = ScanResultStore::in_memory().unwrap();
        let summary = sample_summary();
        store.save_scan(&summary).unwrap();

        let loaded = store.get_scan(&summary.scan_id).unwrap().unwrap();
        assert_eq!(loaded.files_scanned, 42);
        assert_eq!(loaded.status, ScanStatus::Completed);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].threat_type, ThreatType::MediumRisk);
        assert_eq!(loaded.records[0].score, 6);
    }

    #[test]
    fn test_get_unknown_scan() {
        let store = ScanResultStore::in_memory().unwrap();
        assert!(store.get_scan("no-such-id").unwrap().is_none());
    }

    #[test]
    fn test_list_recent_ordering_and_limit() {
        let store = ScanResultStore::in_memory().unwrap();
        for _ in 0..5 {
            store.save_scan(&sample_summary()).unwrap();
        }

        let listed = store.list_recent(3).unwrap();
        assert_eq!(listed.len(), 3);
        // Records are not hydrated in list mode
        assert!(listed[0].records.is_empty());
    }

    #[test]
    fn test_stats_aggregation() {
        let store = ScanResultStore::in_memory().unwrap();
        store.save_scan(&sample_summary()).unwrap();
        store.save_scan(&sample_summary()).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_scans, 2);
        assert_eq!(stats.total_files_scanned, 84);
        assert_eq!(stats.total_threats_found, 2);
        assert!(stats.last_scan_time.is_some());
    }

    #[test]
    fn test_prune_removes_old_scans() {
        let store = ScanResultStore::in_memory().unwrap();
        let mut old = sample_summary();
        old.start_time = Utc::now() - chrono::Duration::days(90);
        store.save_scan(&old).unwrap();
        store.save_scan(&sample_summary()).unwrap();

        let removed = store.prune_older_than(30).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.stats().unwrap().total_scans, 1);
        assert!(store.get_scan(&old.scan_id).unwrap().is_none());
    }

    #[test]
    fn test_save_is_idempotent_per_scan_id() {
        let store = ScanResultStore::in_memory().unwrap();
        let summary = sample_summary();
        store.save_scan(&summary).unwrap();
        store.save_scan(&summary).unwrap();

        assert_eq!(store.stats().unwrap().total_scans, 1);
        let loaded = store.get_scan(&summary.scan_id).unwrap().unwrap();
        assert_eq!(loaded.records.len(), 1);
    }
}
