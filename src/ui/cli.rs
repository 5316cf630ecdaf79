//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DonTe Cleaner: system cleaning, emulator management, and file scanning
#[derive(Parser, Debug)]
#[command(name = "donte")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine processing
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for file threats
    Scan {
        /// Scan common temp and download locations
        #[arg(short, long, conflicts_with_all = ["full", "path"])]
        quick: bool,

        /// Scan all mounted drives
        #[arg(short, long, conflicts_with_all = ["quick", "path"])]
        full: bool,

        /// Scan specific path(s)
        #[arg(short, long, conflicts_with_all = ["quick", "full"])]
        path: Option<Vec<PathBuf>>,

        /// Export the summary as JSON to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not record this scan in history
        #[arg(long)]
        no_history: bool,
    },

    /// Manage quarantined files
    Quarantine {
        #[command(subcommand)]
        action: QuarantineAction,
    },

    /// Manage registered emulators
    Emulator {
        #[command(subcommand)]
        action: EmulatorAction,
    },

    /// Clean temp and privacy locations
    Clean {
        /// Only show what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Run a system maintenance tool
    Tools {
        #[command(subcommand)]
        action: ToolAction,
    },

    /// View scan history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show application information
    Info,
}

/// Quarantine subcommands.
#[derive(Subcommand, Debug)]
pub enum QuarantineAction {
    /// List quarantined items
    List,

    /// Restore a quarantined item
    Restore {
        /// ID of the item to restore
        id: String,

        /// Destination path (defaults to the recorded original path)
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Delete a quarantined item permanently
    Delete {
        /// ID of the item to delete
        id: String,
    },

    /// Delete all quarantined items
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Emulator subcommands.
#[derive(Subcommand, Debug)]
pub enum EmulatorAction {
    /// Register an emulator
    Add {
        /// Display name
        name: String,
        /// Path to the executable
        path: PathBuf,
    },

    /// Remove a registered emulator
    Remove {
        /// Name of the emulator to remove
        name: String,
    },

    /// List registered emulators
    List,

    /// Launch a registered emulator
    Launch {
        /// Name of the emulator to launch
        name: String,
    },

    /// Terminate a previously launched emulator
    Stop {
        /// Process id returned by launch
        pid: u32,
    },
}

/// System tool subcommands.
#[derive(Subcommand, Debug)]
pub enum ToolAction {
    /// Flush the DNS resolver cache
    FlushDns,
    /// Reset the Winsock catalog
    WinsockReset,
    /// Release and renew the DHCP lease
    RenewDhcp,
    /// Start Windows disk cleanup
    DiskCleanup,
    /// Switch to the high-performance power plan
    HighPerformance,
}

/// History subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Show recent scans
    List {
        /// Number of scans to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show one scan with its threat records
    Show {
        /// Scan ID
        id: String,
    },

    /// Show aggregate statistics
    Stats,

    /// Delete old scans
    Clear {
        /// Days of history to keep
        #[arg(short, long, default_value = "30")]
        days: u32,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the configuration file location
    Path,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_flags_parse() {
        let cli = Cli::parse_from(["donte", "scan", "--quick"]);
        match cli.command {
            Some(Commands::Scan { quick, full, .. }) => {
                assert!(quick);
                assert!(!full);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_quarantine_restore_parse() {
        let cli = Cli::parse_from(["donte", "quarantine", "restore", "abc", "--to", "/tmp/x"]);
        match cli.command {
            Some(Commands::Quarantine {
                action: QuarantineAction::Restore { id, to },
            }) => {
                assert_eq!(id, "abc");
                assert_eq!(to, Some(PathBuf::from("/tmp/x")));
            }
            _ => panic!("expected quarantine restore"),
        }
    }

    #[test]
    fn test_conflicting_scan_flags_rejected() {
        assert!(Cli::try_parse_from(["donte", "scan", "--quick", "--full"]).is_err());
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::parse_from(["donte", "--format", "json", "info"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
