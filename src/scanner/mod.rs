//! File system scanning: directory walking, parallel classification,
//! progress tracking, and scan history.

pub mod file;
pub mod progress;
pub mod results;
pub mod walker;

pub use file::FileScanner;
pub use progress::{ConsoleProgressReporter, ProgressTracker, ScanProgress};
pub use results::{ScanResultStore, ScanStatistics};
pub use walker::FileWalker;
