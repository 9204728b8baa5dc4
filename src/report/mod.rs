//! Report output.

pub mod writer;

pub use writer::{sort_by_name, write_json_output, write_output};
