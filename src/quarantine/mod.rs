//! Quarantine management.
//!
//! Flagged files are moved into a holding directory instead of being
//! deleted outright, with durable metadata tracking the original path for
//! restore.

pub mod manager;
pub mod metadata;
pub mod operations;

pub use manager::{QuarantineManager, QuarantineStats};
pub use metadata::{MetadataStore, QuarantineEntry};
pub use operations::SecureOperations;
