//! Configuration file handling.
//!
//! This module handles loading `.cacus.toml`, merging it with the
//! command line, and producing the [`RunConfig`] the pipeline runs with.

use crate::cli::{parse_delimiter, Args, OutputFormat};
use crate::error::CacusError;
use crate::models::ColumnOrder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".cacus.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub aggregate: AggregateConfig,
}

/// Output file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub path: String,

    /// Column delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Column layout.
    #[serde(default)]
    pub columns: ColumnOrder,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output(),
            delimiter: default_delimiter(),
            columns: ColumnOrder::default(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> String {
    "./compliance_results.csv".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Merge per-host rows by check name and result.
    #[serde(default)]
    pub enabled: bool,

    /// Widen the separator between merged entries to follow multi-line values.
    #[serde(default = "default_true")]
    pub padding: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            padding: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub delimiter: u8,
    pub aggregate: bool,
    pub padded: bool,
    pub columns: ColumnOrder,
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output_file {
            self.output.path = output.display().to_string();
        }
        if let Some(ref delimiter) = args.delimiter {
            self.output.delimiter = delimiter.clone();
        }
        if let Some(columns) = args.columns {
            self.output.columns = columns;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }

        // Flags always override
        if args.aggregate {
            self.aggregate.enabled = true;
        }
        if args.no_padding {
            self.aggregate.padding = false;
        }
    }

    /// Resolve the settings for a run over `input`.
    pub fn to_run_config(&self, input: PathBuf) -> Result<RunConfig, CacusError> {
        let delimiter =
            parse_delimiter(&self.output.delimiter).map_err(CacusError::InvalidConfig)?;

        Ok(RunConfig {
            input,
            output: PathBuf::from(&self.output.path),
            delimiter,
            aggregate: self.aggregate.enabled,
            padded: self.aggregate.padding,
            columns: self.output.columns,
            format: self.output.format,
        })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.path, "./compliance_results.csv");
        assert_eq!(config.output.delimiter, ",");
        assert_eq!(config.output.columns, ColumnOrder::HostFirst);
        assert!(!config.aggregate.enabled);
        assert!(config.aggregate.padding);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[output]
path = "out.tsv"
delimiter = "tab"
columns = "check-first"
format = "json"

[aggregate]
enabled = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output.path, "out.tsv");
        assert_eq!(config.output.delimiter, "tab");
        assert_eq!(config.output.columns, ColumnOrder::CheckFirst);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.aggregate.enabled);
        assert!(config.aggregate.padding);
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config: Config = toml::from_str(
            r#"
[output]
delimiter = ";"
columns = "check-first"
"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "cacus",
            "-i",
            "scan.nessus",
            "-o",
            "report.csv",
            "--aggregate",
            "--no-padding",
        ])
        .unwrap();
        config.merge_with_args(&args);

        let run = config.to_run_config(PathBuf::from("scan.nessus")).unwrap();
        assert_eq!(run.output, PathBuf::from("report.csv"));
        assert_eq!(run.delimiter, b';');
        assert_eq!(run.columns, ColumnOrder::CheckFirst);
        assert!(run.aggregate);
        assert!(!run.padded);
    }

    #[test]
    fn test_invalid_delimiter_in_config() {
        let mut config = Config::default();
        config.output.delimiter = "::".to_string();

        let err = config.to_run_config(PathBuf::from("scan.nessus")).unwrap_err();
        assert!(matches!(err, CacusError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[aggregate]\nenabled = true\npadding = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.aggregate.enabled);
        assert!(!config.aggregate.padding);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[aggregate]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
