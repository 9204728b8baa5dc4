//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::ColumnOrder;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cacus - Nessus compliance results to CSV
///
/// Extracts Policy Compliance results from a .nessus report and writes
/// them as delimited text for spreadsheets and downstream reporting.
///
/// Examples:
///   cacus --input-file scan.nessus
///   cacus -i scan.nessus -o results.tsv --delimiter tab
///   cacus -i scan.nessus --aggregate --columns check-first
///   cacus -i scan.nessus --aggregate --no-padding
///   cacus --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the input .nessus file
    #[arg(
        short,
        long = "input-file",
        value_name = "FILE",
        required_unless_present = "init_config"
    )]
    pub input_file: Option<PathBuf>,

    /// Path to the output file
    ///
    /// Default: from config or ./compliance_results.csv
    #[arg(short, long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Output column delimiter (single character, or "tab")
    ///
    /// Default: from config or ","
    #[arg(short, long, value_name = "CHAR", env = "CACUS_DELIMITER")]
    pub delimiter: Option<String>,

    /// Merge per-host results into one row per check and result
    ///
    /// Only PASSED and FAILED results are kept in this mode.
    #[arg(short, long)]
    pub aggregate: bool,

    /// Join merged hostnames and values with a single newline
    ///
    /// By default the separator is widened to keep multi-line values
    /// roughly aligned with their host.
    #[arg(long)]
    pub no_padding: bool,

    /// Column layout of the output (host-first, check-first)
    #[arg(long, value_name = "ORDER")]
    pub columns: Option<ColumnOrder>,

    /// Output format (delimited, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cacus.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .cacus.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text (default)
    #[default]
    Delimited,
    /// JSON array of records
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate input file
        match self.input_file {
            Some(ref input) if !input.is_file() => {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            None => return Err("An input file is required".to_string()),
            _ => {}
        }

        // Validate delimiter
        if let Some(ref delimiter) = self.delimiter {
            parse_delimiter(delimiter)?;
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Turn a delimiter argument into the byte the writer needs.
///
/// Accepts any single ASCII character, plus `tab` and `\t` for TAB.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    if matches!(value, "tab" | "\\t") {
        return Ok(b'\t');
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(format!(
            "Delimiter must be a single ASCII character other than a quote or newline, got {:?}",
            value
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input_file: Some(PathBuf::from(file!())),
            output_file: None,
            delimiter: None,
            aggregate: false,
            no_padding: false,
            columns: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\t"), Ok(b'\t'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input_file = Some(PathBuf::from("/nonexistent/scan.nessus"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_delimiter() {
        let mut args = make_args();
        args.delimiter = Some("ab".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.input_file = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "cacus",
            "-i",
            "scan.nessus",
            "--aggregate",
            "--columns",
            "check-first",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input_file, Some(PathBuf::from("scan.nessus")));
        assert!(args.aggregate);
        assert_eq!(args.columns, Some(ColumnOrder::CheckFirst));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }
}
