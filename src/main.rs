//! Cacus - Nessus Policy Compliance extractor
//!
//! A CLI tool that reads a .nessus report, extracts the results of its
//! Policy Compliance checks, and writes them as delimited text.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, unwritable output, bad config)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod nessus;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, RunConfig, CONFIG_FILE_NAME};
use models::{ComplianceIssue, ResultCounts};
use nessus::XmlElement;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Cacus v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let code = exit_code(run(&args));
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Report a failed run through the log and map it to the process exit code.
fn exit_code(outcome: Result<()>) -> i32 {
    match outcome {
        Ok(()) => 0,
        Err(e) => {
            error!("[!] {:#}", e);
            1
        }
    }
}

/// Handle --init-config: generate a default .cacus.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Resolve settings and run the extraction.
fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let input = args
        .input_file
        .clone()
        .context("An input file is required")?;
    let run_config = config.to_run_config(input)?;

    run_extraction(&run_config)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Read the report, extract, optionally aggregate, sort, and write.
fn run_extraction(config: &RunConfig) -> Result<()> {
    let start_time = Instant::now();

    info!("[i] Reading file from: {}", config.input.display());
    let document = nessus::load_document(&config.input)?;

    let issues = collect_issues(&document);
    let counts = ResultCounts::from_issues(&issues);

    let rows_written = if config.aggregate {
        let mut rows = analysis::aggregate(&issues, config.padded);
        report::sort_by_name(&mut rows);
        write_rows(config, &rows)?;
        rows.len()
    } else {
        let mut rows = issues;
        report::sort_by_name(&mut rows);
        write_rows(config, &rows)?;
        rows.len()
    };

    info!("[i] Output file written to: {}", config.output.display());
    info!(
        "[i] {} rows from {} compliance issues (passed: {}, failed: {}, warning: {}, error: {}) in {:.2}s",
        rows_written,
        counts.total,
        counts.passed,
        counts.failed,
        counts.warning,
        counts.error,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Extract compliance issues from every host of every report, in document order.
fn collect_issues(document: &XmlElement) -> Vec<ComplianceIssue> {
    let mut issues = Vec::new();

    for report in nessus::parse_reports(document) {
        for host in nessus::parse_hosts(report) {
            let hostname = nessus::hostname(host);
            info!("[i] Parsing compliance issues for host: {}", hostname);

            let host_issues = nessus::parse_compliance(host, hostname);
            let counts = ResultCounts::from_issues(&host_issues);
            info!(
                "[i] Found {} compliance issues\n\tPassed:{}\n\tFailed:{}",
                counts.total, counts.passed, counts.failed
            );

            issues.extend(host_issues);
        }
    }

    issues
}

fn write_rows<T>(config: &RunConfig, rows: &[T]) -> Result<()>
where
    T: models::ComplianceRow + serde::Serialize,
{
    match config.format {
        OutputFormat::Delimited => {
            report::write_output(&config.output, rows, config.delimiter, config.columns)?
        }
        OutputFormat::Json => report::write_json_output(&config.output, rows)?,
    }
    Ok(())
}
