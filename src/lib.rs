//! DonTe Cleaner: system cleaning, emulator management, and heuristic
//! file-threat scanning.
//!
//! This crate provides the core functionality behind the `donte` utility:
//! a rule-based file classifier with signature lookup, a parallel directory
//! scanner, a quarantine manager with durable metadata, an emulator process
//! registry, and temp/privacy cleaning helpers.

pub mod cleaner;
pub mod core;
pub mod detection;
pub mod emulator;
pub mod quarantine;
pub mod scanner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::core::types::*;
