//! Nessus report reading.
//!
//! `document` builds the XML tree, `extractor` pulls compliance issues
//! out of it.

pub mod document;
pub mod extractor;

pub use document::{load_document, XmlElement};
pub use extractor::{hostname, parse_compliance, parse_hosts, parse_reports};
