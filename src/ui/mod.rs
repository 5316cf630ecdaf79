//! User interface: command-line definition and dispatch helpers.

pub mod cli;

pub use cli::{Cli, Commands, OutputFormat};
