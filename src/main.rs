//! assetsweep - find unused image assets in a project tree.
//!
//! Usage:
//!   assetsweep [PATH]            Summary of used/unused assets
//!   assetsweep [PATH] unused     List unused assets
//!   assetsweep [PATH] all        List every asset with its first reference
//!   assetsweep [PATH] unusual    List assets referenced from unexpected file types
//!   assetsweep --help            Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use assetsweep_analyze::{Asset, Sweep, UsageReport};
use assetsweep_core::{MatchMode, SweepConfig};

#[derive(Parser)]
#[command(
    name = "assetsweep",
    version,
    about = "Find unused image assets in a project tree",
    long_about = "assetsweep inventories image-set directories and searches the rest of \
                  the project for quoted references to their names.\n\n\
                  Assets never referenced are reported as unused, with the disk space \
                  they occupy."
)]
struct Cli {
    /// Project root to search (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Directory to inventory assets from (defaults to the project root)
    #[arg(short, long, global = true)]
    assets_root: Option<PathBuf>,

    /// Extra directory name to skip while searching (repeatable)
    #[arg(short = 'x', long = "exclude-dir", global = true)]
    exclude_dirs: Vec<String>,

    /// Directory suffix that marks an asset unit
    #[arg(long, default_value = ".imageset", global = true)]
    suffix: String,

    /// Number of matching threads (0 = auto)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    threads: usize,

    /// Record every referencing file, not just the first
    #[arg(long, global = true)]
    exhaustive: bool,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Show totals and unusual reference locations
    Summary,
    /// List unused assets
    Unused,
    /// List every asset with its first reference
    All,
    /// List used assets referenced only from unexpected file types
    Unusual,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    tracing::debug!(
        match_mode = ?config.match_mode,
        threads = config.threads,
        assets_root = %config.effective_assets_root().display(),
        "sweep configured"
    );

    eprintln!("Sweeping {}...", config.scan_root.display());

    let report = Sweep::new(config).run().context("Sweep failed")?;

    if let OutputFormat::Json = cli.format {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Command::Summary) {
        Command::Summary => print_summary(&report),
        Command::Unused => print_assets(report.unused.iter()),
        Command::All => print_assets(report.assets.iter()),
        Command::Unusual => print_unusual(&report),
    }

    if !report.is_complete() {
        eprintln!("Sweep was cancelled; results are partial.");
    }
    if !report.warnings.is_empty() {
        eprintln!("{} warning(s) during sweep", report.warnings.len());
    }

    Ok(())
}

/// Translate command-line options into a sweep configuration.
fn build_config(cli: &Cli) -> Result<SweepConfig> {
    let defaults = SweepConfig::new(&cli.path);
    let mut excluded = defaults.excluded_dir_names;
    excluded.extend(cli.exclude_dirs.iter().cloned());
    // User exclusions are vendored trees: skip their assets too.
    let mut inventory_excluded = defaults.inventory_excluded_dirs;
    inventory_excluded.extend(cli.exclude_dirs.iter().cloned());

    let mut builder = SweepConfig::builder();
    builder
        .scan_root(&cli.path)
        .asset_dir_suffix(cli.suffix.as_str())
        .excluded_dir_names(excluded)
        .inventory_excluded_dirs(inventory_excluded)
        .threads(cli.threads)
        .match_mode(if cli.exhaustive {
            MatchMode::Exhaustive
        } else {
            MatchMode::FirstOccurrence
        });
    if let Some(assets_root) = &cli.assets_root {
        builder.assets_root(assets_root);
    }

    builder.build().context("Invalid options")
}

/// Print totals, unusual locations and timing.
fn print_summary(report: &UsageReport) {
    let stats = &report.stats;

    println!();
    println!("{}", "─".repeat(70));
    println!(
        " Total images: {}, unused: {}, occupying {} bytes on disk.",
        stats.total_assets, stats.unused_assets, stats.unused_bytes
    );
    println!(
        " Unused: {} of {} ({:.1}%)",
        format_size(stats.unused_bytes),
        format_size(stats.total_bytes),
        report.unused_ratio() * 100.0
    );
    println!(
        " {} files searched, {} binary skipped",
        report.reference_stats.files_eligible, report.reference_stats.files_skipped_binary
    );
    println!("{}", "─".repeat(70));

    if !report.unusual.is_empty() {
        println!();
        println!(" Referenced from unusual locations:");
        print_unusual(report);
    }

    println!();
    println!(" Time taken: {:.2}s", report.scan_duration.as_secs_f64());
}

/// Print one line per asset: location, size, first reference.
fn print_assets<'a>(assets: impl Iterator<Item = &'a Asset>) {
    for asset in assets {
        let reference = asset
            .first_occurrence()
            .map(|o| o.file.display().to_string())
            .unwrap_or_else(|| "None".to_string());
        println!(
            "{}, {:.2} kB, {}",
            asset.location.display(),
            asset.size_bytes as f64 / 1000.0,
            reference
        );
    }
}

/// Print `location, file` for each unusual reference.
fn print_unusual(report: &UsageReport) {
    for unusual in &report.unusual {
        println!("{}, {}", unusual.location.display(), unusual.file.display());
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
