//! CLI entry point for DonTe Cleaner.

use donte_cleaner::cleaner::{tools, Cleaner};
use donte_cleaner::core::config::Config;
use donte_cleaner::core::error::Result;
use donte_cleaner::emulator::{self, EmulatorConfig, EmulatorRegistry};
use donte_cleaner::quarantine::QuarantineManager;
use donte_cleaner::scanner::{ConsoleProgressReporter, FileScanner, ScanResultStore};
use donte_cleaner::ui::cli::{
    Cli, Commands, ConfigAction, EmulatorAction, HistoryAction, QuarantineAction, ToolAction,
};
use donte_cleaner::utils::logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Arc::new(Config::load_or_default());
    config.validate()?;

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::from_config(&config)
    };
    init_logging(log_config);

    log::info!("DonTe Cleaner v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Scan {
            quick,
            full,
            path,
            output,
            no_history,
        }) => run_scan(config, quick, full, path, output, no_history, cli.format).await,
        Some(Commands::Quarantine { action }) => run_quarantine(&config, action, cli.format),
        Some(Commands::Emulator { action }) => run_emulator(action, cli.format),
        Some(Commands::Clean { dry_run }) => run_clean(&config, dry_run, cli.format),
        Some(Commands::Tools { action }) => run_tool(action),
        Some(Commands::History { action }) => run_history(action, cli.format),
        Some(Commands::Config { action }) => run_config(action, &config),
        Some(Commands::Info) => run_info(&config),
        None => {
            println!("DonTe Cleaner - system cleaning and file scanning utility");
            println!();
            println!("Use --help for usage information");
            println!();
            println!("Quick start:");
            println!("  donte scan --quick          Scan common locations");
            println!("  donte scan --path <dir>     Scan a specific directory");
            println!("  donte clean --dry-run       Preview temp cleanup");
            println!("  donte quarantine list       View quarantined files");
            Ok(())
        }
    }
}

async fn run_scan(
    config: Arc<Config>,
    quick: bool,
    full: bool,
    path: Option<Vec<PathBuf>>,
    output: Option<PathBuf>,
    no_history: bool,
    format: donte_cleaner::ui::OutputFormat,
) -> Result<()> {
    let scanner = FileScanner::new(Arc::clone(&config));

    if matches!(format, donte_cleaner::ui::OutputFormat::Text) {
        let reporter = ConsoleProgressReporter::new();
        scanner
            .progress()
            .set_callback(move |progress| reporter.report(&progress));
    }

    let summary = if full {
        scanner.full_scan().await?
    } else if let Some(paths) = path {
        scanner.custom_scan(paths).await?
    } else {
        // --quick and the no-flag default both scan the common locations
        let _ = quick;
        scanner.quick_scan().await?
    };

    if !no_history {
        match ScanResultStore::open_default() {
            Ok(store) => {
                if let Err(e) = store.save_scan(&summary) {
                    log::warn!("Failed to record scan history: {}", e);
                }
            }
            Err(e) => log::warn!("Scan history unavailable: {}", e),
        }
    }

    if let Some(ref output_path) = output {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(output_path, json)
            .map_err(|e| donte_cleaner::Error::file_write(output_path, e))?;
        log::info!("Summary written to {:?}", output_path);
    }

    match format {
        donte_cleaner::ui::OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        donte_cleaner::ui::OutputFormat::Text => {
            println!();
            println!("=== Scan Complete ===");
            println!("Scan ID:        {}", summary.scan_id);
            println!("Type:           {}", summary.scan_type);
            println!("Status:         {:?}", summary.status);
            println!("Files scanned:  {}", summary.files_scanned);
            println!("Errors:         {}", summary.errors);
            println!("Threats found:  {}", summary.threats_found);
            if let Some(duration) = summary.duration_secs() {
                println!("Duration:       {}s", duration);
            }
            for record in &summary.records {
                println!();
                println!("[{}] {}", record.severity, record.path.display());
                println!("  {} - {}", record.threat_type, record.description);
            }
        }
    }

    Ok(())
}

fn run_quarantine(
    config: &Config,
    action: QuarantineAction,
    format: donte_cleaner::ui::OutputFormat,
) -> Result<()> {
    let dir = config.quarantine.quarantine_dir();
    let mut manager =
        QuarantineManager::open_with_passes(&dir, config.quarantine.secure_delete_passes)?;

    match action {
        QuarantineAction::List => {
            let items = manager.list();
            match format {
                donte_cleaner::ui::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(items)?);
                }
                donte_cleaner::ui::OutputFormat::Text => {
                    if items.is_empty() {
                        println!("Quarantine is empty.");
                    } else {
                        for item in items {
                            println!(
                                "{}  {}  ({} bytes)  {}",
                                item.id, item.file_name, item.size, item.reason
                            );
                        }
                        let stats = manager.stats();
                        println!();
                        println!(
                            "{} item(s), {} byte(s) total",
                            stats.item_count, stats.total_size
                        );
                    }
                }
            }
        }
        QuarantineAction::Restore { id, to } => {
            let restored = manager.restore(&id, to.as_deref())?;
            println!("Restored to {}", restored.display());
        }
        QuarantineAction::Delete { id } => {
            manager.delete(&id)?;
            println!("Deleted quarantined item {}", id);
        }
        QuarantineAction::Clear { yes } => {
            if !yes {
                println!("This permanently deletes all quarantined files.");
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }
            let removed = manager.clear()?;
            println!("Deleted {} item(s)", removed);
        }
    }

    Ok(())
}

fn run_emulator(action: EmulatorAction, format: donte_cleaner::ui::OutputFormat) -> Result<()> {
    let mut registry = EmulatorRegistry::load_default();

    match action {
        EmulatorAction::Add { name, path } => {
            registry.add(EmulatorConfig::new(name.clone(), path))?;
            println!("Registered emulator '{}'", name);
        }
        EmulatorAction::Remove { name } => {
            registry.remove(&name)?;
            println!("Removed emulator '{}'", name);
        }
        EmulatorAction::List => match format {
            donte_cleaner::ui::OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(registry.list())?);
            }
            donte_cleaner::ui::OutputFormat::Text => {
                if registry.list().is_empty() {
                    println!("No emulators registered.");
                } else {
                    for emulator in registry.list() {
                        println!("{}  {}", emulator.name, emulator.executable_path.display());
                    }
                }
            }
        },
        EmulatorAction::Launch { name } => {
            let pid = registry.launch(&name)?;
            println!("Launched '{}' (pid {})", name, pid);
        }
        EmulatorAction::Stop { pid } => {
            emulator::terminate_process(pid)?;
            println!("Terminated process {}", pid);
        }
    }

    Ok(())
}

fn run_clean(
    config: &Config,
    dry_run: bool,
    format: donte_cleaner::ui::OutputFormat,
) -> Result<()> {
    let cleaner = Cleaner::new(config.cleaner.clone());

    if dry_run {
        let preview = cleaner.preview();
        match format {
            donte_cleaner::ui::OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            }
            donte_cleaner::ui::OutputFormat::Text => {
                println!("Would clean {} directories:", preview.target_dirs.len());
                for dir in &preview.target_dirs {
                    println!("  {}", dir.display());
                }
                println!(
                    "{} file(s), about {} byte(s)",
                    preview.file_count, preview.estimated_bytes
                );
            }
        }
    } else {
        let report = cleaner.clean();
        match format {
            donte_cleaner::ui::OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            donte_cleaner::ui::OutputFormat::Text => {
                println!(
                    "Removed {} file(s), freed {} byte(s), {} failure(s)",
                    report.removed_files, report.freed_bytes, report.failures
                );
            }
        }
    }

    Ok(())
}

fn run_tool(action: ToolAction) -> Result<()> {
    let outcome = match action {
        ToolAction::FlushDns => tools::flush_dns()?,
        ToolAction::WinsockReset => tools::winsock_reset()?,
        ToolAction::RenewDhcp => tools::renew_dhcp_lease()?,
        ToolAction::DiskCleanup => tools::disk_cleanup()?,
        ToolAction::HighPerformance => tools::high_performance_power()?,
    };

    println!("{}: ok", outcome.tool);
    if !outcome.detail.is_empty() {
        println!("{}", outcome.detail);
    }
    Ok(())
}

fn run_history(action: HistoryAction, format: donte_cleaner::ui::OutputFormat) -> Result<()> {
    let store = ScanResultStore::open_default()?;

    match action {
        HistoryAction::List { limit } => {
            let scans = store.list_recent(limit)?;
            match format {
                donte_cleaner::ui::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&scans)?);
                }
                donte_cleaner::ui::OutputFormat::Text => {
                    if scans.is_empty() {
                        println!("No scan history.");
                    } else {
                        for scan in scans {
                            println!(
                                "{}  {}  {}  files: {}  threats: {}",
                                scan.scan_id,
                                scan.start_time.format("%Y-%m-%d %H:%M"),
                                scan.status.as_str(),
                                scan.files_scanned,
                                scan.threats_found
                            );
                        }
                    }
                }
            }
        }
        HistoryAction::Show { id } => {
            match store.get_scan(&id)? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("No scan with id {}", id),
            }
        }
        HistoryAction::Stats => {
            let stats = store.stats()?;
            match format {
                donte_cleaner::ui::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                donte_cleaner::ui::OutputFormat::Text => {
                    println!("Total scans:    {}", stats.total_scans);
                    println!("Files scanned:  {}", stats.total_files_scanned);
                    println!("Bytes scanned:  {}", stats.total_bytes_scanned);
                    println!("Threats found:  {}", stats.total_threats_found);
                    if let Some(last) = stats.last_scan_time {
                        println!("Last scan:      {}", last.format("%Y-%m-%d %H:%M"));
                    }
                }
            }
        }
        HistoryAction::Clear { days } => {
            let removed = store.prune_older_than(days)?;
            println!("Removed {} old scan(s)", removed);
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Reset { yes } => {
            if !yes {
                println!("This replaces the configuration with defaults.");
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }
            Config::default().save(&Config::default_config_path())?;
            println!("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            println!("{}", Config::default_config_path().display());
        }
    }
    Ok(())
}

fn run_info(config: &Config) -> Result<()> {
    println!("DonTe Cleaner");
    println!();
    println!("Version:         {}", env!("CARGO_PKG_VERSION"));
    println!("Config path:     {}", Config::default_config_path().display());
    println!("Data directory:  {}", Config::data_dir().display());
    println!(
        "Quarantine dir:  {}",
        config.quarantine.quarantine_dir().display()
    );
    println!();
    println!("Scan settings:");
    println!("  Workers:       {}", config.scan.scan_threads);
    println!("  File cap:      {}", config.scan.max_files);
    println!(
        "  Report threshold: {}",
        config.detection.report_threshold
    );
    Ok(())
}
