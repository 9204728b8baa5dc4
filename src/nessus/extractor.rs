//! Compliance issue extraction.
//!
//! Walks the `Report` / `ReportHost` / `ReportItem` structure of a parsed
//! report and turns each Policy Compliance item into a [`ComplianceIssue`].
//! Missing fields never fail an item; they become [`NOT_AVAILABLE`].

use super::document::XmlElement;
use crate::models::{ComplianceIssue, ComplianceResult, NOT_AVAILABLE};
use tracing::{debug, info};

/// Namespace of the `cm:compliance-*` elements.
pub const COMPLIANCE_NAMESPACE: &str = "http://www.nessus.org/cm";

/// Plugin family carried by compliance audit items.
pub const POLICY_COMPLIANCE_FAMILY: &str = "Policy Compliance";

const CHECK_NAME: &str = "compliance-check-name";
const ACTUAL_VALUE: &str = "compliance-actual-value";
const POLICY_VALUE: &str = "compliance-policy-value";
const INFO: &str = "compliance-info";
const RESULT: &str = "compliance-result";
const SOLUTION: &str = "compliance-solution";

const EXPECT_PREFIX: &str = "expect: ";

/// Extract the `Report` elements below the document root.
pub fn parse_reports(root: &XmlElement) -> Vec<&XmlElement> {
    root.children_named("Report").collect()
}

/// Extract the hosts from a `Report` element.
pub fn parse_hosts(report: &XmlElement) -> Vec<&XmlElement> {
    info!(
        "[i] Parsing report: {}",
        report.attribute("name").unwrap_or(NOT_AVAILABLE)
    );
    report.children_named("ReportHost").collect()
}

/// Name of a `ReportHost`, or the placeholder when it is missing or blank.
pub fn hostname(host: &XmlElement) -> &str {
    host.attribute("name")
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

/// Extract the compliance issues reported for one host.
pub fn parse_compliance(host: &XmlElement, hostname: &str) -> Vec<ComplianceIssue> {
    let issues: Vec<ComplianceIssue> = host
        .children_named("ReportItem")
        .filter(|item| is_policy_compliance(item))
        .map(|item| parse_item(item, hostname))
        .collect();

    debug!("Extracted {} compliance items for {}", issues.len(), hostname);
    issues
}

fn is_policy_compliance(item: &XmlElement) -> bool {
    item.attribute("pluginFamily") == Some(POLICY_COMPLIANCE_FAMILY)
}

fn parse_item(item: &XmlElement, hostname: &str) -> ComplianceIssue {
    // A bare "expect: " strips to nothing and must still get the placeholder.
    let expected_value = or_placeholder(
        lookup_field(item, POLICY_VALUE)
            .map(|value| strip_expect_prefix(&value).to_string())
            .filter(|value| !value.trim().is_empty()),
    );

    // ComplianceIssue::new replaces the solution of passed checks.
    ComplianceIssue::new(
        hostname.to_string(),
        or_placeholder(lookup_field(item, CHECK_NAME)),
        or_placeholder(lookup_field(item, ACTUAL_VALUE)),
        expected_value,
        or_placeholder(lookup_field(item, INFO)),
        or_placeholder(lookup_field(item, SOLUTION)),
        ComplianceResult::from(or_placeholder(lookup_field(item, RESULT))),
    )
}

/// Text of the `cm:` child element named `tag`, if present and non-empty.
pub fn lookup_field(item: &XmlElement, tag: &str) -> Option<String> {
    item.find_ns(COMPLIANCE_NAMESPACE, tag)
        .and_then(XmlElement::text)
        .map(str::to_string)
}

/// Substitute the placeholder for a missing value.
pub fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Remove a single leading `expect: ` from a policy value.
pub fn strip_expect_prefix(value: &str) -> &str {
    value.strip_prefix(EXPECT_PREFIX).unwrap_or(value)
}
