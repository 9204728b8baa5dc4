//! Compliance issue aggregation.
//!
//! Merges the per-host issues of every check into one row per result, so a
//! check that failed on forty hosts becomes a single FAILED row listing all
//! forty hostnames and their configured values.

use crate::models::{AggregatedIssue, ComplianceIssue, ComplianceResult};
use std::collections::HashMap;
use tracing::debug;

/// Divisor used when padding FAILED rows, whatever the number of hosts.
pub const FAILED_PADDING_DIVISOR: usize = 2;

/// Aggregate issues into one row per (check name, PASSED|FAILED).
///
/// Issues with any other result are dropped. PASSED rows come before
/// FAILED rows for the same check.
pub fn aggregate(issues: &[ComplianceIssue], padded: bool) -> Vec<AggregatedIssue> {
    let mut aggregated = Vec::new();

    for (name, group) in group_by_name(issues) {
        let (passed, failed) = partition_by_result(&group);

        if !passed.is_empty() {
            let repeat = separator_repeat(&passed, passed.len(), padded);
            aggregated.push(merge(&passed, repeat));
        }

        if !failed.is_empty() {
            let repeat = separator_repeat(&failed, FAILED_PADDING_DIVISOR, padded);
            aggregated.push(merge(&failed, repeat));
        }

        debug!(
            "Aggregated {}: {} passed, {} failed, {} dropped",
            name,
            passed.len(),
            failed.len(),
            group.len() - passed.len() - failed.len()
        );
    }

    aggregated
}

/// Group issues by check name, keeping first-appearance order of names.
pub fn group_by_name(issues: &[ComplianceIssue]) -> Vec<(&str, Vec<&ComplianceIssue>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut grouped: Vec<(&str, Vec<&ComplianceIssue>)> = Vec::new();

    for issue in issues {
        let slot = *index.entry(issue.name.as_str()).or_insert_with(|| {
            grouped.push((issue.name.as_str(), Vec::new()));
            grouped.len() - 1
        });
        grouped[slot].1.push(issue);
    }

    grouped
}

/// Split a group into its PASSED and FAILED members.
pub fn partition_by_result<'a>(
    group: &[&'a ComplianceIssue],
) -> (Vec<&'a ComplianceIssue>, Vec<&'a ComplianceIssue>) {
    let passed = group
        .iter()
        .copied()
        .filter(|i| i.result == ComplianceResult::Passed)
        .collect();
    let failed = group
        .iter()
        .copied()
        .filter(|i| i.result == ComplianceResult::Failed)
        .collect();

    (passed, failed)
}

/// Number of newlines placed between successive entries of a merged cell.
///
/// Counts the newlines of the configured values joined by single newlines
/// and divides by `divisor`, rounding up. Always 1 when padding is off.
pub fn separator_repeat(issues: &[&ComplianceIssue], divisor: usize, padded: bool) -> usize {
    if !padded || divisor == 0 {
        return 1;
    }

    let embedded: usize = issues
        .iter()
        .map(|i| i.configured_value.matches('\n').count())
        .sum();
    let newlines = embedded + issues.len().saturating_sub(1);

    newlines.div_ceil(divisor).max(1)
}

fn merge(issues: &[&ComplianceIssue], repeat: usize) -> AggregatedIssue {
    let separator = "\n".repeat(repeat);
    let first = issues[0];

    AggregatedIssue {
        hostname: join(issues, &separator, |i| &i.hostname),
        name: first.name.clone(),
        configured_value: join(issues, &separator, |i| &i.configured_value),
        expected_value: first.expected_value.clone(),
        info: first.info.clone(),
        solution: first.solution.clone(),
        result: first.result.clone(),
        host_count: issues.len(),
    }
}

fn join<F>(issues: &[&ComplianceIssue], separator: &str, field: F) -> String
where
    F: Fn(&ComplianceIssue) -> &String,
{
    issues
        .iter()
        .map(|i| field(*i).as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
