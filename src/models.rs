//! Data models for compliance results.
//!
//! This module contains the record types produced by the extractor and
//! the aggregator, plus the column layout shared by every output row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written for any field the report does not provide.
pub const NOT_AVAILABLE: &str = "n/a";

/// Outcome of a single compliance check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComplianceResult {
    Passed,
    Failed,
    Warning,
    Error,
    /// Anything else the scanner emitted, kept verbatim.
    Other(String),
}

impl fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ComplianceResult {
    /// Returns the result as it is spelled in the report.
    pub fn as_str(&self) -> &str {
        match self {
            ComplianceResult::Passed => "PASSED",
            ComplianceResult::Failed => "FAILED",
            ComplianceResult::Warning => "WARNING",
            ComplianceResult::Error => "ERROR",
            ComplianceResult::Other(s) => s,
        }
    }
}

impl From<&str> for ComplianceResult {
    fn from(s: &str) -> Self {
        match s {
            "PASSED" => ComplianceResult::Passed,
            "FAILED" => ComplianceResult::Failed,
            "WARNING" => ComplianceResult::Warning,
            "ERROR" => ComplianceResult::Error,
            other => ComplianceResult::Other(other.to_string()),
        }
    }
}

impl From<String> for ComplianceResult {
    fn from(s: String) -> Self {
        ComplianceResult::from(s.as_str())
    }
}

impl From<ComplianceResult> for String {
    fn from(result: ComplianceResult) -> Self {
        result.as_str().to_string()
    }
}

/// One compliance finding for one host on one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Name of the scanned host.
    pub hostname: String,
    /// Title of the compliance check.
    pub name: String,
    /// Value found on the host.
    pub configured_value: String,
    /// Value required by the policy, without the `expect: ` prefix.
    pub expected_value: String,
    /// Free-text description of the check.
    pub info: String,
    /// Remediation advice; always the placeholder for passed checks.
    pub solution: String,
    /// Outcome of the check.
    pub result: ComplianceResult,
}

impl ComplianceIssue {
    /// Builds an issue, dropping the solution text when the check passed.
    pub fn new(
        hostname: String,
        name: String,
        configured_value: String,
        expected_value: String,
        info: String,
        solution: String,
        result: ComplianceResult,
    ) -> Self {
        let solution = if result == ComplianceResult::Passed {
            NOT_AVAILABLE.to_string()
        } else {
            solution
        };

        Self {
            hostname,
            name,
            configured_value,
            expected_value,
            info,
            solution,
            result,
        }
    }
}

/// One merged row per (check name, result) pair.
///
/// `hostname` and `configured_value` hold the newline-joined values of every
/// contributing issue; the remaining columns come from the first member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedIssue {
    pub hostname: String,
    pub name: String,
    pub configured_value: String,
    pub expected_value: String,
    pub info: String,
    pub solution: String,
    pub result: ComplianceResult,
    /// Number of issues merged into this row.
    pub host_count: usize,
}

/// Column layout of the delimited output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnOrder {
    /// Host, Check Name, Configured Value, ...
    #[default]
    HostFirst,
    /// Check Name, Host, Configured Value, ...
    CheckFirst,
}

impl ColumnOrder {
    /// Returns the header row for this layout.
    pub fn headers(self) -> [&'static str; 7] {
        let [first, second] = self.arrange("Host", "Check Name");
        [
            first,
            second,
            "Configured Value",
            "Expected Value",
            "Info",
            "Solution",
            "Result",
        ]
    }

    fn arrange<'a>(self, host: &'a str, name: &'a str) -> [&'a str; 2] {
        match self {
            ColumnOrder::HostFirst => [host, name],
            ColumnOrder::CheckFirst => [name, host],
        }
    }
}

/// A record that can be written as one output row.
pub trait ComplianceRow {
    fn check_name(&self) -> &str;

    /// Returns the seven cells in the given column order.
    fn cells(&self, order: ColumnOrder) -> [&str; 7];
}

impl ComplianceRow for ComplianceIssue {
    fn check_name(&self) -> &str {
        &self.name
    }

    fn cells(&self, order: ColumnOrder) -> [&str; 7] {
        let [first, second] = order.arrange(&self.hostname, &self.name);
        [
            first,
            second,
            &self.configured_value,
            &self.expected_value,
            &self.info,
            &self.solution,
            self.result.as_str(),
        ]
    }
}

impl ComplianceRow for AggregatedIssue {
    fn check_name(&self) -> &str {
        &self.name
    }

    fn cells(&self, order: ColumnOrder) -> [&str; 7] {
        let [first, second] = order.arrange(&self.hostname, &self.name);
        [
            first,
            second,
            &self.configured_value,
            &self.expected_value,
            &self.info,
            &self.solution,
            self.result.as_str(),
        ]
    }
}

/// Per-result tally of a set of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warning: usize,
    pub error: usize,
    pub other: usize,
}

impl ResultCounts {
    /// Creates a tally from a list of issues.
    pub fn from_issues(issues: &[ComplianceIssue]) -> Self {
        let mut counts = Self {
            total: issues.len(),
            ..Self::default()
        };

        for issue in issues {
            match issue.result {
                ComplianceResult::Passed => counts.passed += 1,
                ComplianceResult::Failed => counts.failed += 1,
                ComplianceResult::Warning => counts.warning += 1,
                ComplianceResult::Error => counts.error += 1,
                ComplianceResult::Other(_) => counts.other += 1,
            }
        }

        counts
    }
}
