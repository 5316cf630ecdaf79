//! Threat detection: signature table, heuristic rules, file classifier.
//!
//! Detection is a flat rule evaluation. Each rule family contributes
//! independently to a per-file score:
//! - hash lookup against the signature table
//! - filename substring matching
//! - behavioral checks (size band, creation recency, double extension)
//! - content byte-pattern search over the file head
//! - extension denylist

pub mod classifier;
pub mod rules;
pub mod signature;

pub use classifier::FileClassifier;
pub use rules::FilenameRules;
pub use signature::{SignatureEntry, SignatureFile, SignatureTable};
