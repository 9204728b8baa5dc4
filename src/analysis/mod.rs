//! Analysis modules.
//!
//! Post-extraction processing of compliance issues.

pub mod aggregator;

pub use aggregator::*;
