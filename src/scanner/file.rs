//! Scan orchestration: walks directories and classifies files in parallel.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{ScanStatus, ScanSummary, ScanType, ThreatRecord};
use crate::detection::{FileClassifier, SignatureFile, SignatureTable};
use crate::scanner::progress::ProgressTracker;
use crate::scanner::walker::FileWalker;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Quick scan locations on Windows.
#[cfg(windows)]
pub const QUICK_SCAN_PATHS: &[&str] = &[
    "%TEMP%",
    "%APPDATA%",
    "%LOCALAPPDATA%",
    "C:\\Windows\\Temp",
    "%USERPROFILE%\\Downloads",
];

/// Quick scan locations elsewhere (mainly for testing).
#[cfg(not(windows))]
pub const QUICK_SCAN_PATHS: &[&str] = &["/tmp", "/var/tmp"];

/// Per-file outcome reported by a worker.
#[derive(Debug)]
enum WorkerResult {
    /// A threat was found
    Threat(ThreatRecord),
    /// File scanned clean
    Clean { size: u64 },
    /// File skipped due to an error
    Skipped(String),
}

/// Parallel file scanner.
///
/// Classification is embarrassingly parallel: workers pull independent files
/// off a shared queue and report over a channel, with no ordering guarantee.
pub struct FileScanner {
    config: Arc<Config>,
    classifier: Arc<FileClassifier>,
    cancelled: Arc<AtomicBool>,
    progress: Arc<ProgressTracker>,
}

impl FileScanner {
    /// Create a scanner from configuration.
    ///
    /// The built-in signature table is used, extended by the configured
    /// signature file when one is set and loadable.
    pub fn new(config: Arc<Config>) -> Self {
        let mut table = SignatureTable::builtin();
        if let Some(ref path) = config.detection.signature_file {
            match SignatureFile::load(path) {
                Ok(file) => table.merge_file(&file),
                Err(e) => log::warn!("Ignoring signature file {:?}: {}", path, e),
            }
        }

        let classifier = FileClassifier::new(Arc::new(table))
            .with_report_threshold(config.detection.report_threshold);

        Self {
            config,
            classifier: Arc::new(classifier),
            cancelled: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    /// Create a scanner around a prepared classifier.
    pub fn with_classifier(config: Arc<Config>, classifier: FileClassifier) -> Self {
        Self {
            config,
            classifier: Arc::new(classifier),
            cancelled: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    /// Get the progress tracker for callback registration.
    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Request cancellation. The walker and all workers observe the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.progress.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Expand environment placeholders in a quick-scan path (Windows).
    #[cfg(windows)]
    pub fn expand_path(path: &str) -> PathBuf {
        let expanded = path
            .replace("%TEMP%", &std::env::var("TEMP").unwrap_or_default())
            .replace("%APPDATA%", &std::env::var("APPDATA").unwrap_or_default())
            .replace(
                "%LOCALAPPDATA%",
                &std::env::var("LOCALAPPDATA").unwrap_or_default(),
            )
            .replace(
                "%USERPROFILE%",
                &std::env::var("USERPROFILE").unwrap_or_default(),
            );
        PathBuf::from(expanded)
    }

    #[cfg(not(windows))]
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(path)
    }

    /// Scan common temp and download locations.
    pub async fn quick_scan(&self) -> Result<ScanSummary> {
        log::info!("Starting quick scan");
        self.reset();

        let paths: Vec<PathBuf> = QUICK_SCAN_PATHS
            .iter()
            .map(|p| Self::expand_path(p))
            .filter(|p| p.exists())
            .collect();

        self.scan_paths(paths, ScanType::Quick).await
    }

    /// Scan all mounted drives.
    pub async fn full_scan(&self) -> Result<ScanSummary> {
        log::info!("Starting full scan");
        self.reset();

        #[cfg(windows)]
        let roots: Vec<PathBuf> = ["C:\\", "D:\\", "E:\\"]
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .collect();

        #[cfg(not(windows))]
        let roots: Vec<PathBuf> = vec![PathBuf::from("/")];

        self.scan_paths(roots, ScanType::Full).await
    }

    /// Scan user-selected paths.
    pub async fn custom_scan(&self, paths: Vec<PathBuf>) -> Result<ScanSummary> {
        log::info!("Starting custom scan of {} path(s)", paths.len());
        self.reset();
        self.scan_paths(paths, ScanType::Custom).await
    }

    async fn scan_paths(&self, paths: Vec<PathBuf>, scan_type: ScanType) -> Result<ScanSummary> {
        let mut summary = ScanSummary::new(scan_type);
        summary.status = ScanStatus::Running;

        let walker = FileWalker::new(&self.config.scan);
        let queue = walker.collect(&paths, &self.cancelled);
        let total_files = queue.len() as u64;
        self.progress.set_total_files(total_files);
        log::info!("Queued {} file(s) for scanning", total_files);

        let queue = Arc::new(Mutex::new(queue));
        let (tx, mut rx) = mpsc::channel::<WorkerResult>(256);

        let num_workers = self.config.scan.scan_threads.clamp(1, 16);
        let mut handles = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let queue = Arc::clone(&queue);
            let classifier = Arc::clone(&self.classifier);
            let cancelled = Arc::clone(&self.cancelled);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }

                    let item = match queue.lock() {
                        Ok(mut q) => q.pop_front(),
                        Err(_) => {
                            log::error!("Scan queue lock poisoned in worker");
                            break;
                        }
                    };

                    let (path, size) = match item {
                        Some(item) => item,
                        None => break,
                    };

                    let result = match classifier.classify(&path) {
                        Ok(Some(record)) => WorkerResult::Threat(record),
                        Ok(None) => WorkerResult::Clean { size },
                        Err(e) => WorkerResult::Skipped(format!("{}: {}", path.display(), e)),
                    };

                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
            }));
        }

        // Close our sender so the channel drains once workers finish.
        drop(tx);

        while let Some(result) = rx.recv().await {
            match result {
                WorkerResult::Threat(record) => {
                    log::info!(
                        "Threat found: {} ({}) in {:?}",
                        record.description,
                        record.threat_type,
                        record.path
                    );
                    summary.threats_found += 1;
                    summary.files_scanned += 1;
                    summary.bytes_scanned += record.size;
                    self.progress.record_file(record.size);
                    self.progress.record_threat();
                    summary.records.push(record);
                }
                WorkerResult::Clean { size } => {
                    summary.files_scanned += 1;
                    summary.bytes_scanned += size;
                    self.progress.record_file(size);
                }
                WorkerResult::Skipped(reason) => {
                    log::trace!("Skipped: {}", reason);
                    summary.errors += 1;
                    self.progress.record_error();
                }
            }
        }

        for handle in handles {
            let _ = handle.await;
        }

        if self.is_cancelled() {
            summary.cancel();
        } else {
            summary.complete();
        }
        self.progress.complete();

        log::info!(
            "Scan {}: {} file(s), {} threat(s), {} error(s)",
            summary.status.as_str(),
            summary.files_scanned,
            summary.threats_found,
            summary.errors
        );

        Ok(summary)
    }

    /// Classify a single file outside of a full scan.
    pub fn scan_file(&self, path: &std::path::Path) -> Result<Option<ThreatRecord>> {
        self.classifier.classify(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ThreatType;
    use std::fs;
    use tempfile::TempDir;

    const EICAR_STRING: &str =
        "X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

    fn test_config(max_files: usize) -> Arc<Config> {
        let mut config = Config::default();
        config.scan.max_files = max_files;
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_custom_scan_finds_eicar() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("eicar.com.txt"), EICAR_STRING).unwrap();
        fs::write(dir.path().join("clean_one.txt"), b"hello").unwrap();
        fs::write(dir.path().join("clean_two.txt"), b"world").unwrap();

        let scanner = FileScanner::new(test_config(1000));
        let summary = scanner
            .custom_scan(vec![dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(summary.status, ScanStatus::Completed);
        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.threats_found, 1);
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.records[0].threat_type, ThreatType::KnownMalware);
    }

    #[tokio::test]
    async fn test_scan_respects_file_cap() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        let scanner = FileScanner::new(test_config(5));
        let summary = scanner
            .custom_scan(vec![dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(summary.files_scanned, 5);
    }

    #[tokio::test]
    async fn test_result_set_not_larger_than_input() {
        let dir = TempDir::new().unwrap();
        for i in 0..8 {
            fs::write(dir.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        let scanner = FileScanner::new(test_config(1000));
        let summary = scanner
            .custom_scan(vec![dir.path().to_path_buf()])
            .await
            .unwrap();

        assert!(summary.records.len() <= 8);
        assert!(summary.files_scanned <= 8);
    }

    #[tokio::test]
    async fn test_cancelled_scan_reports_cancelled() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"data").unwrap();

        let scanner = FileScanner::new(test_config(1000));
        scanner.cancel();
        // No reset between cancel and scan_paths: call the inner path
        let summary = scanner
            .scan_paths(vec![dir.path().to_path_buf()], ScanType::Custom)
            .await
            .unwrap();

        assert_eq!(summary.status, ScanStatus::Cancelled);
        assert_eq!(summary.files_scanned, 0);
    }

    #[tokio::test]
    async fn test_empty_directory_scan() {
        let dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(test_config(1000));
        let summary = scanner
            .custom_scan(vec![dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(summary.status, ScanStatus::Completed);
        assert_eq!(summary.files_scanned, 0);
        assert!(summary.records.is_empty());
    }

    #[test]
    fn test_cancellation_flag() {
        let scanner = FileScanner::new(test_config(1000));
        assert!(!scanner.is_cancelled());
        scanner.cancel();
        assert!(scanner.is_cancelled());
    }
}
