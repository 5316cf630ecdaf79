//! Directory enumeration feeding the scan queue.

use crate::core::config::ScanConfig;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// Recursive file collector with exclusions and a hard file cap.
pub struct FileWalker<'a> {
    config: &'a ScanConfig,
}

impl<'a> FileWalker<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    /// Check if a path should be excluded from scanning.
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for excluded in &self.config.exclude_paths {
            if path_str.contains(excluded.as_str()) {
                return true;
            }
        }

        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.config.exclude_extensions.contains(&ext_lower) {
                return true;
            }
        }

        false
    }

    /// Enumerate files under the given roots into a scan queue.
    ///
    /// Collection stops once `max_files` paths have been gathered or the
    /// cancellation flag flips. Unreadable entries are skipped silently; the
    /// walk itself never fails.
    pub fn collect(&self, roots: &[PathBuf], cancelled: &AtomicBool) -> VecDeque<(PathBuf, u64)> {
        let mut queue = VecDeque::new();
        let cap = self.config.max_files;

        'roots: for root in roots {
            if cancelled.load(Ordering::SeqCst) {
                break;
            }

            if root.is_file() {
                if let Ok(metadata) = root.metadata() {
                    queue.push_back((root.clone(), metadata.len()));
                }
                if queue.len() >= cap {
                    break;
                }
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(self.config.follow_symlinks)
                .into_iter()
                .filter_entry(|e| !self.should_exclude(e.path()));

            for entry in walker {
                if cancelled.load(Ordering::SeqCst) {
                    break 'roots;
                }

                let entry = match entry {
                    Ok(e) => e,
                    Err(_) => continue,
                };

                let path = entry.path();
                if !path.is_file() {
                    continue;
                }

                let size = match path.metadata() {
                    Ok(m) => m.len(),
                    Err(_) => continue,
                };

                queue.push_back((path.to_path_buf(), size));
                if queue.len() >= cap {
                    log::warn!(
                        "File cap of {} reached, remaining entries under {:?} not scanned",
                        cap,
                        root
                    );
                    break 'roots;
                }
            }
        }

        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate(dir: &TempDir, count: usize) {
        for i in 0..count {
            fs::write(dir.path().join(format!("file_{:04}.txt", i)), b"data").unwrap();
        }
    }

    #[test]
    fn test_collect_all_files() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 10);

        let config = ScanConfig::default();
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn test_collect_respects_cap() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 25);

        let config = ScanConfig {
            max_files: 7,
            ..Default::default()
        };
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 7);
    }

    #[test]
    fn test_collect_recurses_subdirectories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested").join("deeper");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("inner.bin"), b"x").unwrap();
        fs::write(dir.path().join("outer.bin"), b"y").unwrap();

        let config = ScanConfig::default();
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_excluded_extension_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("disc.iso"), b"big image").unwrap();
        fs::write(dir.path().join("real.txt"), b"text").unwrap();

        let config = ScanConfig::default();
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 1);
        assert!(queue[0].0.ends_with("real.txt"));
    }

    #[test]
    fn test_excluded_path_fragment_skipped() {
        let dir = TempDir::new().unwrap();
        let skipped = dir.path().join("node_modules");
        fs::create_dir_all(&skipped).unwrap();
        fs::write(skipped.join("dep.js"), b"x").unwrap();
        fs::write(dir.path().join("app.js"), b"y").unwrap();

        let config = ScanConfig {
            exclude_paths: vec!["node_modules".to_string()],
            ..Default::default()
        };
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancelled_collect_stops_early() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 5);

        let config = ScanConfig::default();
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[dir.path().to_path_buf()], &AtomicBool::new(true));

        assert!(queue.is_empty());
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.txt");
        fs::write(&file, b"alone").unwrap();

        let config = ScanConfig::default();
        let walker = FileWalker::new(&config);
        let queue = walker.collect(&[file.clone()], &AtomicBool::new(false));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].0, file);
    }
}
