//! Configuration management.
//!
//! Settings are persisted as flat JSON and read permissively: a missing or
//! unparseable file falls back to defaults, and missing keys take their
//! field defaults so configs written by older versions keep loading.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scan-related settings
    #[serde(default)]
    pub scan: ScanConfig,
    /// Detection settings
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Quarantine settings
    #[serde(default)]
    pub quarantine: QuarantineConfig,
    /// Cleaner category toggles
    #[serde(default)]
    pub cleaner: CleanerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigSave(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| Error::ConfigSave(format!("Failed to write config file: {}", e)))
    }

    /// Load configuration from the default location, or fall back to defaults.
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    log::warn!("Failed to load config, using defaults: {}", e);
                }
            }
        }

        let config = Self::default();

        if let Err(e) = config.save(&config_path) {
            log::warn!("Failed to save default config: {}", e);
        }

        config
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Get the application data directory.
    pub fn data_dir() -> PathBuf {
        #[cfg(windows)]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData"))
                .join("DonTeCleaner")
        }

        #[cfg(not(windows))]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("donte-cleaner")
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.scan.scan_threads == 0 {
            return Err(Error::ConfigInvalid {
                field: "scan.scan_threads".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.scan.max_files == 0 {
            return Err(Error::ConfigInvalid {
                field: "scan.max_files".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.quarantine.secure_delete_passes == 0 {
            return Err(Error::ConfigInvalid {
                field: "quarantine.secure_delete_passes".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Scan-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of parallel scan workers
    pub scan_threads: usize,
    /// Maximum number of files collected per scan
    pub max_files: usize,
    /// Whether to follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Path fragments excluded from scanning
    pub exclude_paths: Vec<String>,
    /// File extensions excluded from scanning
    pub exclude_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_threads: 4,
            max_files: 1000,
            follow_symlinks: false,
            exclude_paths: vec![
                #[cfg(windows)]
                "C:\\Windows\\WinSxS".to_string(),
                #[cfg(windows)]
                "C:\\$Recycle.Bin".to_string(),
                #[cfg(not(windows))]
                "/proc".to_string(),
                #[cfg(not(windows))]
                "/sys".to_string(),
            ],
            exclude_extensions: vec!["iso".to_string(), "vmdk".to_string(), "vhd".to_string()],
        }
    }
}

/// Detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum cumulative score for a file to be reported
    pub report_threshold: u32,
    /// Optional JSON signature file merged into the built-in table
    pub signature_file: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            report_threshold: 2,
            signature_file: None,
        }
    }
}

/// Quarantine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarantineConfig {
    /// Quarantine directory override
    pub quarantine_dir: Option<PathBuf>,
    /// Overwrite passes used when permanently deleting an item
    pub secure_delete_passes: usize,
}

impl Default for QuarantineConfig {
    fn default() -> Self {
        Self {
            quarantine_dir: None,
            secure_delete_passes: 3,
        }
    }
}

impl QuarantineConfig {
    /// Effective quarantine directory.
    ///
    /// Defaults to a `DonTeQuarantine` folder on the user's desktop, with the
    /// application data directory as a fallback for headless systems.
    pub fn quarantine_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.quarantine_dir {
            return dir.clone();
        }
        dirs::desktop_dir()
            .map(|d| d.join("DonTeQuarantine"))
            .unwrap_or_else(|| Config::data_dir().join("quarantine"))
    }
}

/// Cleaner category toggles.
///
/// Every category defaults to enabled except prefetch, which touches a
/// system-managed cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub windows_temp: bool,
    pub user_temp: bool,
    pub browser_cache: bool,
    pub crash_dumps: bool,
    pub thumbnail_cache: bool,
    pub recent_items: bool,
    pub prefetch: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            windows_temp: true,
            user_temp: true,
            browser_cache: true,
            crash_dumps: true,
            thumbnail_cache: true,
            recent_items: true,
            prefetch: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable verbose console output
    pub verbose_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verbose_console: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.scan_threads, 4);
        assert_eq!(config.scan.max_files, 1000);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.scan.max_files, config.scan.max_files);
        assert_eq!(loaded.cleaner.prefetch, config.cleaner.prefetch);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"scan": {"scan_threads": 8}}"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.scan.scan_threads, 8);
        assert_eq!(loaded.scan.max_files, 1000);
        assert_eq!(loaded.detection.report_threshold, 2);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = Config::default();
        config.scan.max_files = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quarantine_dir_override() {
        let config = QuarantineConfig {
            quarantine_dir: Some(PathBuf::from("/custom/vault")),
            ..Default::default()
        };
        assert_eq!(config.quarantine_dir(), PathBuf::from("/custom/vault"));
    }
}
