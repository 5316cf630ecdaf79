//! Temp and privacy cleaning.
//!
//! Candidate locations are resolved from the environment per enabled
//! category, previewed without touching anything, and cleaned best-effort:
//! entries that cannot be removed are counted and logged, never fatal.

pub mod tools;

use crate::core::config::CleanerConfig;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Dry-run result: what would be removed.
#[derive(Debug, Clone, Serialize)]
pub struct CleanPreview {
    /// Directories that would be emptied
    pub target_dirs: Vec<PathBuf>,
    /// Number of files that would be removed
    pub file_count: u64,
    /// Estimated bytes freed
    pub estimated_bytes: u64,
}

/// Outcome of a cleaning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    /// Files actually removed
    pub removed_files: u64,
    /// Bytes freed
    pub freed_bytes: u64,
    /// Entries that could not be removed (in use, permission denied)
    pub failures: u64,
}

/// Temp/privacy cleaner over a category configuration.
pub struct Cleaner {
    categories: CleanerConfig,
}

impl Cleaner {
    pub fn new(categories: CleanerConfig) -> Self {
        Self { categories }
    }

    /// Resolve candidate directories for the enabled categories.
    ///
    /// Only directories that currently exist are returned.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();

        if self.categories.user_temp {
            dirs.push(std::env::temp_dir());
        }

        #[cfg(windows)]
        {
            let env_dir = |var: &str, suffix: &str| {
                std::env::var(var)
                    .ok()
                    .map(|base| PathBuf::from(base).join(suffix))
            };

            if self.categories.windows_temp {
                if let Ok(windir) = std::env::var("WINDIR") {
                    dirs.push(PathBuf::from(windir).join("Temp"));
                }
            }
            if self.categories.browser_cache {
                dirs.extend(env_dir(
                    "LOCALAPPDATA",
                    "Google\\Chrome\\User Data\\Default\\Cache",
                ));
                dirs.extend(env_dir(
                    "LOCALAPPDATA",
                    "Microsoft\\Edge\\User Data\\Default\\Cache",
                ));
            }
            if self.categories.crash_dumps {
                dirs.extend(env_dir("LOCALAPPDATA", "CrashDumps"));
            }
            if self.categories.thumbnail_cache {
                dirs.extend(env_dir("LOCALAPPDATA", "Microsoft\\Windows\\Explorer"));
            }
            if self.categories.recent_items {
                dirs.extend(env_dir("APPDATA", "Microsoft\\Windows\\Recent"));
            }
            if self.categories.prefetch {
                if let Ok(windir) = std::env::var("WINDIR") {
                    dirs.push(PathBuf::from(windir).join("Prefetch"));
                }
            }
        }

        #[cfg(not(windows))]
        {
            if self.categories.browser_cache {
                if let Some(cache) = dirs::cache_dir() {
                    dirs.push(cache.join("mozilla"));
                    dirs.push(cache.join("google-chrome"));
                }
            }
            if self.categories.crash_dumps {
                dirs.push(PathBuf::from("/var/crash"));
            }
            if self.categories.thumbnail_cache {
                if let Some(cache) = dirs::cache_dir() {
                    dirs.push(cache.join("thumbnails"));
                }
            }
        }

        dirs.retain(|d| d.is_dir());
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// Preview what a cleaning run would remove.
    pub fn preview(&self) -> CleanPreview {
        self.preview_paths(&self.candidate_dirs())
    }

    /// Preview specific directories.
    pub fn preview_paths(&self, targets: &[PathBuf]) -> CleanPreview {
        let mut file_count = 0u64;
        let mut estimated_bytes = 0u64;

        for dir in targets {
            for entry in WalkDir::new(dir).into_iter().flatten() {
                if entry.path().is_file() {
                    file_count += 1;
                    estimated_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
                }
            }
        }

        CleanPreview {
            target_dirs: targets.to_vec(),
            file_count,
            estimated_bytes,
        }
    }

    /// Clean all enabled categories.
    pub fn clean(&self) -> CleanReport {
        self.clean_paths(&self.candidate_dirs())
    }

    /// Empty the given directories, keeping the directories themselves.
    pub fn clean_paths(&self, targets: &[PathBuf]) -> CleanReport {
        let mut report = CleanReport::default();

        for dir in targets {
            log::debug!("Cleaning {:?}", dir);
            // Deepest entries first so emptied subdirectories can be removed
            for entry in WalkDir::new(dir).contents_first(true).into_iter().flatten() {
                let path = entry.path();
                if path == dir.as_path() {
                    continue;
                }

                if path.is_file() {
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    match fs::remove_file(path) {
                        Ok(()) => {
                            report.removed_files += 1;
                            report.freed_bytes += size;
                        }
                        Err(e) => {
                            log::trace!("Could not remove {:?}: {}", path, e);
                            report.failures += 1;
                        }
                    }
                } else if path.is_dir() && fs::remove_dir(path).is_err() {
                    // Non-empty or in use; leave it behind
                    log::trace!("Left directory in place: {:?}", path);
                }
            }
        }

        log::info!(
            "Cleaning done: {} file(s) removed, {} byte(s) freed, {} failure(s)",
            report.removed_files,
            report.freed_bytes,
            report.failures
        );
        report
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(CleanerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(dir: &TempDir) -> u64 {
        fs::write(dir.path().join("a.tmp"), b"1234").unwrap();
        fs::write(dir.path().join("b.tmp"), b"56789").unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("c.log"), b"0").unwrap();
        10 // total bytes written
    }

    #[test]
    fn test_preview_counts_without_deleting() {
        let dir = TempDir::new().unwrap();
        let total = populate(&dir);

        let cleaner = Cleaner::default();
        let preview = cleaner.preview_paths(&[dir.path().to_path_buf()]);

        assert_eq!(preview.file_count, 3);
        assert_eq!(preview.estimated_bytes, total);
        assert!(dir.path().join("a.tmp").exists());
    }

    #[test]
    fn test_clean_removes_files_and_empty_subdirs() {
        let dir = TempDir::new().unwrap();
        let total = populate(&dir);

        let cleaner = Cleaner::default();
        let report = cleaner.clean_paths(&[dir.path().to_path_buf()]);

        assert_eq!(report.removed_files, 3);
        assert_eq!(report.freed_bytes, total);
        assert_eq!(report.failures, 0);
        assert!(!dir.path().join("a.tmp").exists());
        assert!(!dir.path().join("nested").exists());
        // The target directory itself survives
        assert!(dir.path().exists());
    }

    #[test]
    fn test_clean_empty_target() {
        let dir = TempDir::new().unwrap();
        let report = Cleaner::default().clean_paths(&[dir.path().to_path_buf()]);
        assert_eq!(report.removed_files, 0);
        assert_eq!(report.failures, 0);
    }

    #[test]
    fn test_candidate_dirs_exist() {
        let cleaner = Cleaner::default();
        for dir in cleaner.candidate_dirs() {
            assert!(dir.is_dir());
        }
    }

    #[test]
    fn test_disabled_categories_shrink_candidates() {
        let all_off = CleanerConfig {
            windows_temp: false,
            user_temp: false,
            browser_cache: false,
            crash_dumps: false,
            thumbnail_cache: false,
            recent_items: false,
            prefetch: false,
        };
        assert!(Cleaner::new(all_off).candidate_dirs().is_empty());
    }
}
