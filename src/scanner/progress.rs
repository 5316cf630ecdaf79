//! Scan progress tracking and reporting.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Point-in-time progress snapshot handed to callbacks.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files scanned
    pub files_scanned: u64,
    /// Number of bytes scanned
    pub bytes_scanned: u64,
    /// Number of threats found
    pub threats_found: u32,
    /// Number of files skipped due to errors
    pub errors: u32,
    /// Total files queued for this scan, once known
    pub total_files: Option<u64>,
    /// Scan start time
    pub start_time: Instant,
    /// Whether scan is complete
    pub is_complete: bool,
    /// Whether scan was cancelled
    pub is_cancelled: bool,
}

impl ScanProgress {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Files processed per second.
    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.files_scanned as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Completion percentage, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total_files.map(|total| {
            if total > 0 {
                (self.files_scanned as f64 / total as f64) * 100.0
            } else {
                100.0
            }
        })
    }
}

/// Shared progress tracker updated by scan workers.
pub struct ProgressTracker {
    files_scanned: AtomicU64,
    bytes_scanned: AtomicU64,
    threats_found: AtomicU64,
    errors: AtomicU64,
    total_files: RwLock<Option<u64>>,
    start_time: Instant,
    is_complete: AtomicBool,
    is_cancelled: AtomicBool,
    #[allow(clippy::type_complexity)]
    callback: RwLock<Option<Box<dyn Fn(ScanProgress) + Send + Sync>>>,
    callback_interval: Duration,
    last_callback: RwLock<Instant>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            files_scanned: AtomicU64::new(0),
            bytes_scanned: AtomicU64::new(0),
            threats_found: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_files: RwLock::new(None),
            start_time: now,
            is_complete: AtomicBool::new(false),
            is_cancelled: AtomicBool::new(false),
            callback: RwLock::new(None),
            callback_interval: Duration::from_millis(100),
            last_callback: RwLock::new(now),
        }
    }

    /// Register a callback invoked at most every 100ms while counters move.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        if let Ok(mut cb) = self.callback.write() {
            *cb = Some(Box::new(callback));
        }
    }

    pub fn set_total_files(&self, total: u64) {
        if let Ok(mut t) = self.total_files.write() {
            *t = Some(total);
        }
    }

    pub fn record_file(&self, bytes: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_scanned.fetch_add(bytes, Ordering::Relaxed);
        self.maybe_callback();
    }

    pub fn record_threat(&self) {
        self.threats_found.fetch_add(1, Ordering::Relaxed);
        self.maybe_callback();
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark scan as complete and flush the callback.
    pub fn complete(&self) {
        self.is_complete.store(true, Ordering::SeqCst);
        self.force_callback();
    }

    /// Mark scan as cancelled and flush the callback.
    pub fn cancel(&self) {
        self.is_cancelled.store(true, Ordering::SeqCst);
        self.force_callback();
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            threats_found: self.threats_found.load(Ordering::Relaxed) as u32,
            errors: self.errors.load(Ordering::Relaxed) as u32,
            total_files: self.total_files.read().ok().and_then(|t| *t),
            start_time: self.start_time,
            is_complete: self.is_complete.load(Ordering::SeqCst),
            is_cancelled: self.is_cancelled.load(Ordering::SeqCst),
        }
    }

    fn maybe_callback(&self) {
        let due = self
            .last_callback
            .read()
            .map(|last| last.elapsed() >= self.callback_interval)
            .unwrap_or(false);
        if due {
            self.force_callback();
        }
    }

    fn force_callback(&self) {
        if let Ok(mut last) = self.last_callback.write() {
            *last = Instant::now();
        }
        if let Ok(callback) = self.callback.read() {
            if let Some(ref cb) = *callback {
                cb(self.snapshot());
            }
        }
    }
}

/// In-place console progress line for the CLI.
pub struct ConsoleProgressReporter {
    last_line_length: std::sync::atomic::AtomicUsize,
}

impl Default for ConsoleProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self {
            last_line_length: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn report(&self, progress: &ScanProgress) {
        let status = if progress.is_cancelled {
            "Cancelled"
        } else if progress.is_complete {
            "Complete"
        } else {
            "Scanning"
        };

        let message = if let Some(pct) = progress.percentage() {
            format!(
                "\r[{}] {:.1}% | Files: {} | Threats: {} | Rate: {:.0}/s",
                status,
                pct,
                progress.files_scanned,
                progress.threats_found,
                progress.files_per_second()
            )
        } else {
            format!(
                "\r[{}] Files: {} | Threats: {} | Rate: {:.0}/s",
                status,
                progress.files_scanned,
                progress.threats_found,
                progress.files_per_second()
            )
        };

        let last_len = self.last_line_length.load(Ordering::Relaxed);
        let padding = last_len.saturating_sub(message.len());
        eprint!("{}{}", message, " ".repeat(padding));
        self.last_line_length.store(message.len(), Ordering::Relaxed);

        if progress.is_complete || progress.is_cancelled {
            eprintln!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters() {
        let tracker = ProgressTracker::new();
        tracker.record_file(100);
        tracker.record_file(400);
        tracker.record_threat();
        tracker.record_error();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.files_scanned, 2);
        assert_eq!(snapshot.bytes_scanned, 500);
        assert_eq!(snapshot.threats_found, 1);
        assert_eq!(snapshot.errors, 1);
    }

    #[test]
    fn test_callback_fires_on_complete() {
        let tracker = Arc::new(ProgressTracker::new());
        let calls = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&calls);
        tracker.set_callback(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        tracker.complete();
        assert!(calls.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_percentage_needs_total() {
        let tracker = ProgressTracker::new();
        assert!(tracker.snapshot().percentage().is_none());

        tracker.set_total_files(4);
        tracker.record_file(1);
        assert_eq!(tracker.snapshot().percentage(), Some(25.0));
    }

    #[test]
    fn test_cancel_flag_visible_in_snapshot() {
        let tracker = ProgressTracker::new();
        assert!(!tracker.snapshot().is_cancelled);
        tracker.cancel();
        assert!(tracker.snapshot().is_cancelled);
    }
}
