//! DNSBL Check CLI Application
//!
//! A command-line interface for checking an IPv4 address, or every address of
//! a /24 subnet, against DNS-based blackhole lists. Listed addresses are
//! written to a timestamped JSON or text report.

mod ui;

use chrono::{DateTime, TimeZone};
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use dnsbl_check_lib::{
    expand_input, is_valid_zone, load_env_config, parse_timeout_string, write_report,
    AggregatedResult, BlacklistChecker, CheckConfig, ConfigManager, DnsblCheckError, FileConfig,
    OutputFormat, MAX_CONCURRENCY,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for dnsbl-check
#[derive(Parser, Debug)]
#[command(name = "dnsbl-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Alptekin Sünnetci")]
#[command(about = "Check an IPv4 address or /24 subnet against DNS blackhole lists")]
#[command(
    long_about = "Check an IPv4 address or /24 subnet against DNS-based blackhole lists (DNSBLs).\n\nEvery address is probed against every configured list with bounded concurrency and a hard per-lookup timeout. Listed addresses are written to a timestamped JSON or text report."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// IPv4 address (203.0.113.5) or /24 subnet (203.0.113.0/24)
    #[arg(
        value_name = "TARGET",
        required_unless_present_any = ["list_blacklists", "init_config"],
        help_heading = "Target"
    )]
    pub target: Option<String>,

    /// Maximum number of addresses probed at once [default: 100]
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout, e.g. "3", "3s" or "1m" [default: 3s]
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        help_heading = "Performance"
    )]
    pub timeout: Option<String>,

    /// Additional blacklist zones (comma-separated or multiple -b flags)
    #[arg(short = 'b', long = "blacklist", value_name = "ZONE", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Blacklists")]
    pub blacklists: Vec<String>,

    /// Skip the built-in blacklist registry
    #[arg(long = "no-defaults", help_heading = "Blacklists")]
    pub no_defaults: bool,

    /// List the blacklists that would be checked and exit
    #[arg(long = "list-blacklists", help_heading = "Blacklists")]
    pub list_blacklists: bool,

    /// Report format: json or text [default: json]
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output"
    )]
    pub format: Option<String>,

    /// Directory the report file is written to
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = ".",
        help_heading = "Output"
    )]
    pub output_dir: PathBuf,

    /// Only print matches and the summary
    #[arg(short = 'q', long = "quiet", help_heading = "Output")]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Output")]
    pub verbose: bool,

    /// Use a specific config file instead of discovered files
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Write the effective configuration to FILE and exit
    #[arg(
        long = "init-config",
        value_name = "FILE",
        help_heading = "Configuration"
    )]
    pub init_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the default level.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(format!(
                "Concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            ));
        }
    }

    if let Some(timeout) = &args.timeout {
        match parse_timeout_string(timeout) {
            Some(secs) if secs > 0 => {}
            _ => {
                return Err(format!(
                    "Invalid timeout '{}'. Use a positive value like '3', '3s' or '1m'",
                    timeout
                ))
            }
        }
    }

    if let Some(format) = &args.format {
        format
            .parse::<OutputFormat>()
            .map_err(|e| e.to_string())?;
    }

    if let Some(bad) = args.blacklists.iter().find(|zone| !is_valid_zone(zone)) {
        return Err(format!("Invalid blacklist zone '{}'", bad));
    }

    Ok(())
}

/// Main checking logic
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    if args.list_blacklists {
        ui::print_blacklists(&config.effective_blacklists());
        return Ok(());
    }

    if let Some(path) = &args.init_config {
        ConfigManager::new(args.verbose).save_file(path, &FileConfig::from_check_config(&config))?;
        ui::print_config_written(path);
        return Ok(());
    }

    let target = args.target.as_deref().ok_or("No target given")?;
    let expanded = expand_input(target)?;

    let blacklists = config.effective_blacklists();
    if blacklists.is_empty() {
        return Err("No blacklists to check. Add zones with -b/--blacklist or drop --no-defaults".into());
    }

    ui::print_header(
        &expanded.label,
        expanded.addresses.len(),
        blacklists.len(),
        config.concurrency,
    );

    let output_format = config.output_format;
    let checker = BlacklistChecker::new(config)?;
    let quiet = args.quiet;
    let report = checker
        .check_addresses(&expanded.addresses, |event| ui::print_event(event, quiet))
        .await;

    let written = finish_run(
        &report.results,
        &args.output_dir,
        &expanded.label,
        output_format,
        &chrono::Local::now(),
    )?;
    ui::print_report_outcome(written.as_deref());

    ui::print_summary(
        report.results.len(),
        report.addresses_checked,
        report.duration,
    );

    Ok(())
}

/// Write the report unless nothing was listed.
///
/// Returns the path of the written file, or `None` for an empty result.
fn finish_run<Tz>(
    results: &AggregatedResult,
    output_dir: &Path,
    label: &str,
    format: OutputFormat,
    timestamp: &DateTime<Tz>,
) -> Result<Option<PathBuf>, DnsblCheckError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if results.is_empty() {
        return Ok(None);
    }
    write_report(output_dir, label, results, format, timestamp).map(Some)
}

/// Build the run configuration with proper precedence.
///
/// Highest first:
/// 1. CLI arguments
/// 2. Environment variables (DBC_*)
/// 3. Config file: `--config`, else `DBC_CONFIG`, else discovered files
/// 4. Built-in defaults
fn build_config(args: &Args) -> Result<CheckConfig, Box<dyn std::error::Error>> {
    let mut config = CheckConfig::default();
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config();

    let explicit_path = args
        .config
        .as_ref()
        .map(|path| (path, "--config"))
        .or_else(|| env_config.config.as_ref().map(|path| (path, "DBC_CONFIG")));

    if let Some((path, source)) = explicit_path {
        debug!(%path, source, "using explicit config file");
        let file_config = config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        config = file_config.apply_to(config);
    } else {
        debug!("discovering config files");
        config = config_manager.discover_and_load()?.apply_to(config);
    }

    config = env_config.apply_to(config);
    config = apply_cli_args_to_config(config, args)?;
    config.validate()?;

    Ok(config)
}

/// Apply CLI arguments to config (highest precedence).
///
/// Only flags the user actually passed override earlier layers.
fn apply_cli_args_to_config(
    mut config: CheckConfig,
    args: &Args,
) -> Result<CheckConfig, Box<dyn std::error::Error>> {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    if let Some(timeout) = &args.timeout {
        let secs = parse_timeout_string(timeout)
            .filter(|secs| *secs > 0)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout))?;
        config.timeout = Duration::from_secs(secs);
    }

    if let Some(format) = &args.format {
        config.output_format = format.parse()?;
    }

    if args.no_defaults {
        config.blacklists.clear();
    }

    config
        .custom_blacklists
        .extend(args.blacklists.iter().map(|zone| zone.trim().to_string()));

    Ok(config)
}
