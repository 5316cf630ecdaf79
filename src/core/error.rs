//! Error types and result handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for DonTe Cleaner operations.
#[derive(Error, Debug)]
pub enum Error {
    // ===== I/O Errors =====
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file: {path}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access directory: {path}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Configuration Errors =====
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSave(String),

    #[error("Invalid configuration value: {field} - {message}")]
    ConfigInvalid { field: String, message: String },

    // ===== Signature Errors =====
    #[error("Failed to load signatures: {0}")]
    SignatureLoad(String),

    // ===== Scanning Errors =====
    #[error("Scan was cancelled")]
    ScanCancelled,

    #[error("Failed to scan file: {path} - {reason}")]
    ScanError { path: PathBuf, reason: String },

    // ===== Quarantine Errors =====
    #[error("Failed to quarantine file: {path} - {reason}")]
    QuarantineFailed { path: PathBuf, reason: String },

    #[error("Failed to restore quarantined item {id}: {reason}")]
    RestoreFailed { id: String, reason: String },

    #[error("Quarantine item not found: {0}")]
    QuarantineItemNotFound(String),

    // ===== Emulator Errors =====
    #[error("Emulator not found: {0}")]
    EmulatorNotFound(String),

    #[error("Emulator already registered: {0}")]
    EmulatorExists(String),

    #[error("Failed to launch emulator {name}: {reason}")]
    EmulatorLaunch { name: String, reason: String },

    // ===== Process Errors =====
    #[error("Failed to terminate process: {pid} - {reason}")]
    ProcessTermination { pid: u32, reason: String },

    // ===== Cleaner / Tool Errors =====
    #[error("System tool failed: {tool} - {reason}")]
    ToolFailed { tool: String, reason: String },

    // ===== Database Errors =====
    #[error("Database error: {0}")]
    DatabaseSql(#[from] rusqlite::Error),

    #[error("Failed to initialize database: {0}")]
    DatabaseInit(String),

    // ===== Concurrency Errors =====
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    // ===== Serialization Errors =====
    #[error("JSON serialization error")]
    JsonSerialize(#[from] serde_json::Error),

    // ===== Generic Errors =====
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Create a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a scan error.
    pub fn scan_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ScanError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a quarantine failure.
    pub fn quarantine_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::QuarantineFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(context: impl Into<String>) -> Self {
        Self::LockPoisoned {
            context: context.into(),
        }
    }

    /// Check if this error is recoverable (the scan can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. }
                | Error::PermissionDenied { .. }
                | Error::PathNotFound(_)
                | Error::ScanError { .. }
        )
    }

    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::ScanCancelled)
    }

    /// Get a user-facing suggestion for how to resolve this error, when one exists.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::PermissionDenied { .. } => {
                Some("Try running with elevated privileges (administrator)")
            }
            Error::PathNotFound(_) => Some("Check that the path exists and is accessible"),
            Error::ConfigLoad(_) | Error::ConfigInvalid { .. } => {
                Some("Check the configuration file for syntax errors or missing fields")
            }
            Error::QuarantineItemNotFound(_) => {
                Some("The item may have already been restored or deleted")
            }
            Error::EmulatorNotFound(_) => {
                Some("Register the emulator first: donte emulator add <name> <path>")
            }
            Error::ScanCancelled => Some("Scan was interrupted by user request"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PathNotFound(PathBuf::from("/test/path"));
        assert_eq!(err.to_string(), "Path not found: /test/path");
    }

    #[test]
    fn test_recoverable_errors() {
        let err = Error::scan_error("/test", "test reason");
        assert!(err.is_recoverable());

        let err = Error::ScanCancelled;
        assert!(!err.is_recoverable());
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_suggestion() {
        assert!(Error::EmulatorNotFound("dolphin".into()).suggestion().is_some());
        assert!(Error::Internal("oops".into()).suggestion().is_none());
    }
}
